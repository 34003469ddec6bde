//! Customer identity: ids, contact email, password rules and account tiers.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tourism_core::{AppError, AppResult};
use uuid::Uuid;

/// Shortest accepted password, in characters.
const PASSWORD_MIN_CHARS: usize = 8;
/// Longest accepted password, in characters. Bounds the hashing cost.
const PASSWORD_MAX_CHARS: usize = 128;
/// RFC 5321 path limit.
const EMAIL_MAX_LEN: usize = 254;

/// Passwords rejected regardless of length.
const WEAK_PASSWORDS: &[&str] = &[
    "12345678",
    "123456789",
    "1234567890",
    "11111111",
    "00000000",
    "password",
    "password1",
    "password123",
    "qwertyuiop",
    "iloveyou",
    "travel123",
    "tourism123",
];

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps a stored identifier.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the stored identifier.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(formatter)
    }
}

/// Lower-cased contact email with a single `@` and a dotted domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalizes and checks a user-entered address.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();
        let invalid = |reason: &str| AppError::Validation(format!("email address {reason}"));

        if normalized.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if normalized.len() > EMAIL_MAX_LEN {
            return Err(invalid("is too long"));
        }
        if normalized.matches('@').count() != 1 {
            return Err(invalid("must contain exactly one '@'"));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(invalid("must contain exactly one '@'"));
        };
        if local.is_empty() {
            return Err(invalid("needs a name before '@'"));
        }
        if domain.split('.').count() < 2 || domain.split('.').any(str::is_empty) {
            return Err(invalid("needs a dotted domain"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain spaces"));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Checks a new password: 8 to 128 characters and not a well-known weak value.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();

    if length < PASSWORD_MIN_CHARS {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_CHARS} characters"
        )));
    }
    if length > PASSWORD_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_CHARS} characters"
        )));
    }

    let lowered = password.to_lowercase();
    if WEAK_PASSWORDS.contains(&lowered.as_str()) {
        return Err(AppError::Validation("password is too easy to guess".to_owned()));
    }

    Ok(())
}

/// Authorization role stored on a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular customer account.
    User,
    /// Back-office administrator.
    Admin,
}

impl UserRole {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown user role '{value}'"))),
        }
    }
}

/// Trust level of a customer account.
///
/// Accounts start as `Guest`, become `Verified` once their email is
/// confirmed, and may then be promoted to `Ambassador`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    /// Account created by a first OTP request.
    Guest,
    /// Account whose email was confirmed.
    Verified,
    /// Account allowed to refer other travellers.
    Ambassador,
}

impl UserType {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "GUEST",
            Self::Verified => "VERIFIED",
            Self::Ambassador => "AMBASSADOR",
        }
    }

    /// Tier after a successful email confirmation. Never demotes.
    #[must_use]
    pub fn after_email_verification(self) -> Self {
        match self {
            Self::Guest => Self::Verified,
            other => other,
        }
    }
}

impl FromStr for UserType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "GUEST" => Ok(Self::Guest),
            "VERIFIED" => Ok(Self::Verified),
            "AMBASSADOR" => Ok(Self::Ambassador),
            _ => Err(AppError::Validation(format!("unknown user type '{value}'"))),
        }
    }
}

/// Referral code handed out on ambassador promotion: `AMB_<USERNAME>_<millis>`.
#[must_use]
pub fn ambassador_code(username: &str, issued_at_ms: i64) -> String {
    let tag: String = username
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|character| character.to_ascii_uppercase())
        .collect();

    format!("AMB_{tag}_{issued_at_ms}")
}
