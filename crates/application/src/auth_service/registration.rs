use tourism_domain::{EmailAddress, RateLimitPlan, validate_password};
use tracing::{debug, info};

use super::*;

impl AuthService {
    /// Reports whether a mobile number belongs to a user and whether that
    /// user can log in with a password.
    pub async fn init_login(&self, raw_mobile: &str) -> AppResult<LoginOptions> {
        let mobile = canonical_mobile(raw_mobile)?;
        let user = self.user_repository.find_by_mobile(&mobile).await?;

        let options = LoginOptions {
            user_exists: user.is_some(),
            has_password: user.is_some_and(|user| user.password_hash.is_some()),
        };

        debug!(
            mobile = %mobile,
            user_exists = options.user_exists,
            has_password = options.has_password,
            "login options"
        );
        Ok(options)
    }

    /// Applies optional profile fields and a password to the authenticated
    /// user.
    ///
    /// Consumes one `LOGIN` slot for the user's mobile, since it can
    /// replace the password.
    pub async fn complete_registration(
        &self,
        user_id: UserId,
        details: RegistrationDetails,
    ) -> AppResult<()> {
        let user = self.require_user(user_id).await?;
        self.rate_limiter
            .check_rate_limit(&user.mobile, RateLimitPlan::Login)?;

        let email = details
            .email
            .map(EmailAddress::new)
            .transpose()?
            .map(String::from);

        let password_hash = match details.password {
            Some(password) => {
                validate_password(&password)?;
                Some(self.password_hasher.hash_password(&password)?)
            }
            None => None,
        };

        self.user_repository
            .update_profile(
                user.id,
                ProfileUpdate {
                    username: non_blank(details.username),
                    email,
                    password_hash,
                    first_name: non_blank(details.first_name),
                    last_name: non_blank(details.last_name),
                },
            )
            .await?;

        info!(mobile = %user.mobile, user_id = %user.id, "registration completed");
        Ok(())
    }

    /// Resolves the user behind an access token.
    pub async fn current_user(&self, token: &str) -> AppResult<UserRecord> {
        let subject = self.token_issuer.verify(token)?;

        self.user_repository
            .find_by_mobile(&subject)
            .await?
            .ok_or_else(|| AppError::Unauthorized("token subject no longer exists".to_owned()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
