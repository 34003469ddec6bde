//! Request and response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tourism_application::{AuthSession, LoginOptions, UserRecord};
use tourism_domain::{UserRole, UserType};

/// Envelope wrapping every JSON body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rate_limit_keys: usize,
}

#[derive(Debug, Deserialize)]
pub struct MobileRequest {
    pub mobile: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub mobile: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordLoginRequest {
    pub mobile: String,
    pub password: String,
}

/// The account comes from the bearer token, never from the body.
#[derive(Debug, Deserialize)]
pub struct SetInitialPasswordRequest {
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRegistrationRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbassadorResponse {
    pub ambassador_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOptionsResponse {
    pub user_exists: bool,
    pub has_password: bool,
}

impl From<LoginOptions> for LoginOptionsResponse {
    fn from(options: LoginOptions) -> Self {
        Self {
            user_exists: options.user_exists,
            has_password: options.has_password,
        }
    }
}

/// Public view of a user. Secrets never leave the service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub mobile: String,
    pub username: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub user_type: UserType,
    pub country_code: String,
    pub mobile_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_verified: bool,
    pub ambassador_code: Option<String>,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            has_password: user.password_hash.is_some(),
            mobile: user.mobile,
            username: user.username,
            email: user.email,
            role: user.role,
            user_type: user.user_type,
            country_code: user.country_code,
            mobile_number: user.mobile_number,
            first_name: user.first_name,
            last_name: user.last_name,
            email_verified: user.email_verified,
            ambassador_code: user.ambassador_code,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthSessionResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<AuthSession> for AuthSessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}
