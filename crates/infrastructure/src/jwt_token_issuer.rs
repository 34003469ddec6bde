//! HS256 access tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tourism_application::TokenIssuer;
use tourism_core::{AppError, AppResult};
use tracing::debug;

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    iss: String,
}

/// Signs and verifies access tokens whose subject is the canonical mobile.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    lifetime: Duration,
}

impl JwtTokenIssuer {
    /// Creates an issuer from a shared secret.
    pub fn new(secret: &str, issuer: impl Into<String>, lifetime: Duration) -> AppResult<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "token secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            lifetime,
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, subject: &str) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AppError::Internal("access token expiry overflows".to_owned()))?;
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign access token: {error}")))
    }

    fn verify(&self, token: &str) -> AppResult<String> {
        decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map(|data| data.claims.sub)
            .map_err(|error| {
                debug!(error = %error, "rejected access token");
                AppError::Unauthorized("access token is invalid or expired".to_owned())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn issuer(lifetime: Duration) -> AppResult<JwtTokenIssuer> {
        JwtTokenIssuer::new(SECRET, "tourism-api", lifetime)
    }

    #[test]
    fn verified_token_yields_subject() -> AppResult<()> {
        let issuer = issuer(Duration::hours(24))?;
        let token = issuer.issue("9123456789")?;

        assert_eq!(issuer.verify(&token)?, "9123456789");
        Ok(())
    }

    #[test]
    fn overflowing_lifetime_fails_without_panicking() -> AppResult<()> {
        let issuer = issuer(Duration::MAX)?;
        assert!(matches!(issuer.issue("9123456789"), Err(AppError::Internal(_))));
        Ok(())
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = JwtTokenIssuer::new("too-short", "tourism-api", Duration::hours(1));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn expired_token_is_unauthorized() -> AppResult<()> {
        let issuer = issuer(Duration::minutes(-10))?;
        let token = issuer.issue("9123456789")?;

        assert!(matches!(
            issuer.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
        Ok(())
    }

    #[test]
    fn token_from_other_secret_is_unauthorized() -> AppResult<()> {
        let other = JwtTokenIssuer::new(
            "ffffffffffffffffffffffffffffffff",
            "tourism-api",
            Duration::hours(1),
        )?;
        let token = other.issue("9123456789")?;

        assert!(matches!(
            issuer(Duration::hours(1))?.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
        Ok(())
    }

    #[test]
    fn token_from_other_issuer_is_unauthorized() -> AppResult<()> {
        let other = JwtTokenIssuer::new(SECRET, "someone-else", Duration::hours(1))?;
        let token = other.issue("9123456789")?;

        assert!(issuer(Duration::hours(1))?.verify(&token).is_err());
        assert!(issuer(Duration::hours(1))?.verify("garbage").is_err());
        Ok(())
    }
}
