use tourism_application::{AuthService, FixedWindowRateLimiter};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub rate_limiter: FixedWindowRateLimiter,
    /// Rate limit by `x-forwarded-for` instead of the peer address.
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(auth_service: AuthService, trust_forwarded_for: bool) -> Self {
        let rate_limiter = auth_service.rate_limiter().clone();
        Self {
            auth_service,
            rate_limiter,
            trust_forwarded_for,
        }
    }
}
