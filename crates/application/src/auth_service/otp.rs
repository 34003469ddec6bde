use tourism_domain::RateLimitPlan;
use tracing::{debug, info, warn};

use super::otp_code::{CodePurpose, hash_code};
use super::*;

impl AuthService {
    /// Issues a one-time code to a mobile number, creating a guest user on
    /// first contact.
    ///
    /// Consumes one `OTP` slot for the canonical mobile.
    pub async fn send_verification_code(&self, raw_mobile: &str) -> AppResult<()> {
        let mobile = canonical_mobile(raw_mobile)?;
        self.settings.mobile_policy.validate(&mobile)?;
        self.rate_limiter.check_rate_limit(&mobile, RateLimitPlan::Otp)?;

        let user = match self.user_repository.find_by_mobile(&mobile).await? {
            Some(user) => user,
            None => self.create_guest(raw_mobile, &mobile).await?,
        };

        let code = self.otp_generator.generate()?;
        let expires_at = self.code_expiry()?;

        self.user_repository
            .save_verification_code(user.id, &hash_code(CodePurpose::Login, &code), expires_at)
            .await?;

        self.sms_sender
            .send_text(&mobile, &format!("Your verification code is {code}"))
            .await?;

        info!(mobile = %mobile, user_id = %user.id, "verification code issued");
        Ok(())
    }

    /// Verifies a one-time code and issues an access token.
    ///
    /// Consumes one `LOGIN` slot for the canonical mobile. Unknown users,
    /// wrong codes and expired codes fail with the same error.
    pub async fn verify_code(&self, raw_mobile: &str, code: &str) -> AppResult<AuthSession> {
        let mobile = canonical_mobile(raw_mobile)?;
        self.rate_limiter.check_rate_limit(&mobile, RateLimitPlan::Login)?;

        let invalid =
            || AppError::Unauthorized("verification code is invalid or expired".to_owned());

        let Some(mut user) = self.user_repository.find_by_mobile(&mobile).await? else {
            warn!(mobile = %mobile, "verification attempted for unknown mobile");
            return Err(invalid());
        };

        let code_matches = match (
            user.verification_code_hash.as_deref(),
            user.verification_code_expires_at,
        ) {
            (Some(stored_hash), Some(expires_at)) => {
                Utc::now() < expires_at && stored_hash == hash_code(CodePurpose::Login, code)
            }
            _ => false,
        };

        if !code_matches {
            warn!(mobile = %mobile, user_id = %user.id, "invalid verification code");
            return Err(invalid());
        }

        self.user_repository.clear_verification_code(user.id).await?;
        user.verification_code_hash = None;
        user.verification_code_expires_at = None;

        let token = self.token_issuer.issue(&user.mobile)?;

        info!(mobile = %mobile, user_id = %user.id, "verification code accepted");
        Ok(AuthSession { token, user })
    }

    /// Creates the guest user for a first-contact mobile. A concurrent
    /// request may create it first, in which case that user is returned.
    async fn create_guest(&self, raw_mobile: &str, mobile: &str) -> AppResult<UserRecord> {
        let parsed = tourism_domain::mobile::parse(Some(raw_mobile))
            .ok_or_else(|| AppError::Validation("mobile number is not valid".to_owned()))?;

        info!(mobile = %mobile, "creating guest user on first verification request");
        let created = self
            .user_repository
            .create(NewUser {
                mobile: mobile.to_owned(),
                country_code: parsed.country_code,
                mobile_number: parsed.national_number,
            })
            .await;

        match created {
            Err(AppError::Conflict(_)) => {
                debug!(mobile = %mobile, "guest user created concurrently");
                self.require_user_by_mobile(mobile).await
            }
            other => other,
        }
    }

    async fn require_user_by_mobile(&self, mobile: &str) -> AppResult<UserRecord> {
        self.user_repository
            .find_by_mobile(mobile)
            .await?
            .ok_or_else(|| AppError::Internal(format!("user '{mobile}' vanished after conflict")))
    }
}
