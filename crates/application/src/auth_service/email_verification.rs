use tourism_domain::{RateLimitPlan, ambassador_code};
use tracing::{info, warn};

use super::otp_code::{CodePurpose, hash_code};
use super::*;

impl AuthService {
    /// Emails a one-time code that confirms the authenticated user's
    /// contact email.
    ///
    /// Consumes one `OTP` slot for the user's mobile. Replaces any pending
    /// code, including an SMS login code.
    pub async fn send_email_verification(&self, user_id: UserId) -> AppResult<()> {
        let user = self.require_user(user_id).await?;
        self.rate_limiter
            .check_rate_limit(&user.mobile, RateLimitPlan::Otp)?;

        let Some(email) = user.email.as_deref() else {
            return Err(AppError::Validation(
                "add an email address before verifying it".to_owned(),
            ));
        };
        if user.email_verified {
            return Err(AppError::Conflict("email is already verified".to_owned()));
        }

        let code = self.otp_generator.generate()?;
        let expires_at = self.code_expiry()?;

        self.user_repository
            .save_verification_code(user.id, &hash_code(CodePurpose::Email, &code), expires_at)
            .await?;

        self.email_sender
            .send_email(
                email,
                "Confirm your email",
                &format!("Your email verification code is {code}"),
            )
            .await?;

        info!(user_id = %user.id, "email verification code issued");
        Ok(())
    }

    /// Confirms the contact email with a code from `send_email_verification`
    /// and returns the updated user. Guests become `VERIFIED`.
    ///
    /// Consumes one `LOGIN` slot for the user's mobile.
    pub async fn verify_email(&self, user_id: UserId, code: &str) -> AppResult<UserRecord> {
        let user = self.require_user(user_id).await?;
        self.rate_limiter
            .check_rate_limit(&user.mobile, RateLimitPlan::Login)?;

        let code_matches = match (
            user.verification_code_hash.as_deref(),
            user.verification_code_expires_at,
        ) {
            (Some(stored_hash), Some(expires_at)) => {
                Utc::now() < expires_at && stored_hash == hash_code(CodePurpose::Email, code)
            }
            _ => false,
        };

        if user.email.is_none() || !code_matches {
            warn!(user_id = %user.id, "invalid email verification code");
            return Err(AppError::Validation(
                "verification code is invalid or expired".to_owned(),
            ));
        }

        let user_type = user.user_type.after_email_verification();
        self.user_repository
            .mark_email_verified(user.id, user_type)
            .await?;

        info!(user_id = %user.id, user_type = user_type.as_str(), "email verified");
        self.require_user(user.id).await
    }

    /// Promotes a user with a verified email to `AMBASSADOR` and returns
    /// the new referral code.
    pub async fn upgrade_to_ambassador(&self, user_id: UserId) -> AppResult<String> {
        let user = self.require_user(user_id).await?;

        if user.user_type == UserType::Ambassador {
            return Err(AppError::Conflict("user is already an ambassador".to_owned()));
        }
        if !user.email_verified {
            return Err(AppError::Forbidden(
                "verify your email before becoming an ambassador".to_owned(),
            ));
        }

        let code = ambassador_code(&user.username, Utc::now().timestamp_millis());
        self.user_repository
            .promote_to_ambassador(user.id, &code)
            .await?;

        info!(user_id = %user.id, ambassador_code = %code, "user promoted to ambassador");
        Ok(code)
    }
}
