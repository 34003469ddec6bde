//! Shared fixtures for handler and router tests.

use std::sync::Arc;

use tourism_application::{
    AuthPorts, AuthService, AuthSettings, FixedWindowRateLimiter, OtpGenerator,
};
use tourism_core::AppResult;
use tourism_domain::PlanTable;
use tourism_infrastructure::{
    Argon2PasswordHasher, ConsoleEmailSender, ConsoleSmsSender, InMemoryUserRepository,
    JwtTokenIssuer, SystemClock,
};

use crate::state::AppState;

pub const SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const CODE: &str = "135790";

struct FixedOtpGenerator;

impl OtpGenerator for FixedOtpGenerator {
    fn generate(&self) -> AppResult<String> {
        Ok(CODE.to_owned())
    }
}

pub fn token_issuer() -> Arc<JwtTokenIssuer> {
    match JwtTokenIssuer::new(SECRET, "tourism-api", chrono::Duration::hours(1)) {
        Ok(issuer) => Arc::new(issuer),
        Err(error) => panic!("token issuer should build: {error}"),
    }
}

/// In-memory state whose code generator always yields [`CODE`].
pub fn test_state() -> AppState {
    let rate_limiter =
        FixedWindowRateLimiter::new(PlanTable::default(), Arc::new(SystemClock::new()));

    let auth_service = AuthService::new(
        AuthPorts {
            user_repository: Arc::new(InMemoryUserRepository::new()),
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
            token_issuer: token_issuer(),
            sms_sender: Arc::new(ConsoleSmsSender::new()),
            email_sender: Arc::new(ConsoleEmailSender::new()),
            otp_generator: Arc::new(FixedOtpGenerator),
        },
        rate_limiter,
        AuthSettings::default(),
    );

    AppState::new(auth_service, false)
}
