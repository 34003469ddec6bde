//! Mobile-first authentication ports and application service.
//!
//! Owns the one-time code flow (issue, verify), password login, the
//! follow-up registration steps and email verification. Anonymous
//! operations canonicalize the mobile number first. Rate limits are always
//! keyed by the canonical mobile so punctuation changes cannot reset a
//! caller's budget. Operations for an authenticated caller take the
//! `UserId` resolved from the bearer token, never a mobile from the body.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tourism_core::{AppError, AppResult};
use tourism_domain::{MobilePolicy, UserId, UserRole, UserType, mobile};

use crate::FixedWindowRateLimiter;

mod otp;
mod email_verification;
mod otp_code;
mod password;
mod registration;


pub use otp_code::RandomOtpGenerator;

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Canonical mobile number, unique per user.
    pub mobile: String,
    /// Public username, defaults to the mobile number.
    pub username: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Argon2id password hash, or `None` for OTP-only accounts.
    pub password_hash: Option<String>,
    /// Authorization role.
    pub role: UserRole,
    /// Trust level.
    pub user_type: UserType,
    /// Dial code derived from the mobile number.
    pub country_code: String,
    /// National part of the mobile number.
    pub mobile_number: String,
    /// Given name, if provided.
    pub first_name: Option<String>,
    /// Family name, if provided.
    pub last_name: Option<String>,
    /// The current email was confirmed with a code.
    pub email_verified: bool,
    /// Referral code, set on ambassador promotion.
    pub ambassador_code: Option<String>,
    /// SHA-256 digest of the pending one-time code.
    pub verification_code_hash: Option<String>,
    /// Expiry of the pending one-time code.
    pub verification_code_expires_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a user on first contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Canonical mobile number.
    pub mobile: String,
    /// Dial code derived from the mobile number.
    pub country_code: String,
    /// National part of the mobile number.
    pub mobile_number: String,
}

/// Optional profile changes applied by registration completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New username.
    pub username: Option<String>,
    /// New validated email.
    pub email: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by canonical mobile number.
    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by their unique identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates a guest user. Fails with `Conflict` if the mobile is taken.
    async fn create(&self, user: NewUser) -> AppResult<UserRecord>;

    /// Stores the digest and expiry of a freshly issued one-time code.
    async fn save_verification_code(
        &self,
        user_id: UserId,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Removes any pending one-time code.
    async fn clear_verification_code(&self, user_id: UserId) -> AppResult<()>;

    /// Updates the password hash for a user.
    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()>;

    /// Applies the non-empty fields of a profile update. A changed email
    /// resets `email_verified`.
    async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> AppResult<()>;

    /// Marks the current email as confirmed, stores the resulting tier and
    /// clears the pending code.
    async fn mark_email_verified(&self, user_id: UserId, user_type: UserType) -> AppResult<()>;

    /// Sets the ambassador tier and its referral code.
    async fn promote_to_ambassador(&self, user_id: UserId, ambassador_code: &str)
    -> AppResult<()>;
}

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Port for signed access tokens.
pub trait TokenIssuer: Send + Sync {
    /// Issues a token for the given subject.
    fn issue(&self, subject: &str) -> AppResult<String>;

    /// Verifies a token and returns its subject.
    fn verify(&self, token: &str) -> AppResult<String>;
}

/// Port for text message delivery.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Sends a text message to a canonical mobile number.
    async fn send_text(&self, to: &str, body: &str) -> AppResult<()>;
}

/// Port for outbound email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends a plain-text email.
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Port for one-time code generation.
pub trait OtpGenerator: Send + Sync {
    /// Returns a fresh six-digit code.
    fn generate(&self) -> AppResult<String>;
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What the client needs to know before choosing a login method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOptions {
    /// A user with this mobile exists.
    pub user_exists: bool,
    /// That user has a password set.
    pub has_password: bool,
}

/// Successful authentication.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Signed access token.
    pub token: String,
    /// Authenticated user.
    pub user: UserRecord,
}

/// Parameters for registration completion.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDetails {
    /// Desired username.
    pub username: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Adapters the auth service depends on.
#[derive(Clone)]
pub struct AuthPorts {
    /// User persistence.
    pub user_repository: Arc<dyn UserRepository>,
    /// Password hashing.
    pub password_hasher: Arc<dyn PasswordHasher>,
    /// Access token signing.
    pub token_issuer: Arc<dyn TokenIssuer>,
    /// Text message delivery.
    pub sms_sender: Arc<dyn SmsSender>,
    /// Email delivery.
    pub email_sender: Arc<dyn EmailSender>,
    /// One-time code source.
    pub otp_generator: Arc<dyn OtpGenerator>,
}

/// Tunables of the auth flow.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Shape requirements for mobile numbers that receive codes.
    pub mobile_policy: MobilePolicy,
    /// Lifetime of an issued one-time code.
    pub otp_ttl: chrono::Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            mobile_policy: MobilePolicy::permissive(),
            otp_ttl: chrono::Duration::minutes(2),
        }
    }
}

/// Application service for mobile authentication.
#[derive(Clone)]
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_issuer: Arc<dyn TokenIssuer>,
    sms_sender: Arc<dyn SmsSender>,
    email_sender: Arc<dyn EmailSender>,
    otp_generator: Arc<dyn OtpGenerator>,
    rate_limiter: FixedWindowRateLimiter,
    settings: AuthSettings,
}

impl AuthService {
    /// Creates a new auth service.
    #[must_use]
    pub fn new(
        ports: AuthPorts,
        rate_limiter: FixedWindowRateLimiter,
        settings: AuthSettings,
    ) -> Self {
        Self {
            user_repository: ports.user_repository,
            password_hasher: ports.password_hasher,
            token_issuer: ports.token_issuer,
            sms_sender: ports.sms_sender,
            email_sender: ports.email_sender,
            otp_generator: ports.otp_generator,
            rate_limiter,
            settings,
        }
    }

    /// Returns the shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &FixedWindowRateLimiter {
        &self.rate_limiter
    }

    async fn require_user(&self, user_id: UserId) -> AppResult<UserRecord> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))
    }

    fn code_expiry(&self) -> AppResult<DateTime<Utc>> {
        Utc::now()
            .checked_add_signed(self.settings.otp_ttl)
            .ok_or_else(|| AppError::Internal("verification code expiry overflows".to_owned()))
    }
}

fn canonical_mobile(raw: &str) -> AppResult<String> {
    mobile::standardize(Some(raw))
        .ok_or_else(|| AppError::Validation("mobile number is not valid".to_owned()))
}
