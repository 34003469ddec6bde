use tourism_domain::{RateLimitPlan, validate_password};
use tracing::{info, warn};

use super::*;

/// Hashed when the account does not exist, to keep response times uniform.
const TIMING_DUMMY_PASSWORD: &str = "timing-equalization-password";

impl AuthService {
    /// Authenticates a user with mobile number and password.
    ///
    /// Consumes one `LOGIN` slot for the canonical mobile. Unknown users,
    /// OTP-only accounts and wrong passwords fail with the same error.
    pub async fn login_with_password(
        &self,
        raw_mobile: &str,
        password: &str,
    ) -> AppResult<AuthSession> {
        let mobile = canonical_mobile(raw_mobile)?;
        self.rate_limiter.check_rate_limit(&mobile, RateLimitPlan::Login)?;

        let failed = || AppError::Unauthorized("invalid mobile number or password".to_owned());

        let Some(user) = self.user_repository.find_by_mobile(&mobile).await? else {
            // Unknown users still cost one hash.
            let _ = self.password_hasher.hash_password(TIMING_DUMMY_PASSWORD);
            return Err(failed());
        };

        let Some(stored_hash) = user.password_hash.as_deref() else {
            let _ = self.password_hasher.hash_password(TIMING_DUMMY_PASSWORD);
            return Err(failed());
        };

        if !self.password_hasher.verify_password(password, stored_hash)? {
            warn!(mobile = %mobile, user_id = %user.id, "invalid password");
            return Err(failed());
        }

        let token = self.token_issuer.issue(&user.mobile)?;

        info!(mobile = %mobile, user_id = %user.id, "password login succeeded");
        Ok(AuthSession { token, user })
    }

    /// Sets the first password of an OTP-only account for the
    /// authenticated user.
    ///
    /// Consumes one `LOGIN` slot for the user's mobile.
    pub async fn set_initial_password(&self, user_id: UserId, new_password: &str) -> AppResult<()> {
        let user = self.require_user(user_id).await?;
        self.rate_limiter
            .check_rate_limit(&user.mobile, RateLimitPlan::Login)?;

        if user.password_hash.is_some() {
            return Err(AppError::Conflict("password is already set".to_owned()));
        }

        validate_password(new_password)?;

        let password_hash = self.password_hasher.hash_password(new_password)?;
        self.user_repository
            .update_password(user.id, &password_hash)
            .await?;

        info!(mobile = %user.mobile, user_id = %user.id, "initial password set");
        Ok(())
    }
}
