use axum::Json;
use axum::extract::{Extension, State};
use tourism_application::{RegistrationDetails, UserRecord};

use crate::dto::{
    ApiResponse, AuthSessionResponse, CompleteRegistrationRequest, LoginOptionsResponse,
    MobileRequest, PasswordLoginRequest, SetInitialPasswordRequest, UserResponse,
    VerifyCodeRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/auth/init-login - Report whether the mobile is registered.
pub async fn init_login_handler(
    State(state): State<AppState>,
    Json(payload): Json<MobileRequest>,
) -> ApiResult<Json<ApiResponse<LoginOptionsResponse>>> {
    let options = state.auth_service.init_login(&payload.mobile).await?;
    let message = if options.user_exists {
        "user exists"
    } else {
        "new user"
    };

    Ok(Json(ApiResponse::ok(message, options.into())))
}

/// POST /api/auth/send-verification - Issue a one-time code by SMS.
pub async fn send_verification_handler(
    State(state): State<AppState>,
    Json(payload): Json<MobileRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state
        .auth_service
        .send_verification_code(&payload.mobile)
        .await?;

    Ok(Json(ApiResponse::message("verification code sent")))
}

/// POST /api/auth/verify-code - Exchange a one-time code for a token.
pub async fn verify_code_handler(
    State(state): State<AppState>,
    Json(payload): Json<VerifyCodeRequest>,
) -> ApiResult<Json<ApiResponse<AuthSessionResponse>>> {
    let session = state
        .auth_service
        .verify_code(&payload.mobile, &payload.code)
        .await?;

    Ok(Json(ApiResponse::ok("login successful", session.into())))
}

/// POST /api/auth/login-password - Exchange mobile and password for a token.
pub async fn login_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<PasswordLoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthSessionResponse>>> {
    let session = state
        .auth_service
        .login_with_password(&payload.mobile, &payload.password)
        .await?;

    Ok(Json(ApiResponse::ok("login successful", session.into())))
}

/// POST /api/auth/set-initial-password - Set the first password of the
/// authenticated user.
pub async fn set_initial_password_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(payload): Json<SetInitialPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state
        .auth_service
        .set_initial_password(user.id, &payload.password)
        .await?;

    Ok(Json(ApiResponse::message("password set")))
}

/// POST /api/auth/complete-registration
pub async fn complete_registration_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(payload): Json<CompleteRegistrationRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state
        .auth_service
        .complete_registration(
            user.id,
            RegistrationDetails {
                username: payload.username,
                email: payload.email,
                password: payload.password,
                first_name: payload.first_name,
                last_name: payload.last_name,
            },
        )
        .await?;

    Ok(Json(ApiResponse::message("registration completed")))
}

/// GET /api/auth/me - Return the user behind the bearer token.
pub async fn me_handler(
    Extension(user): Extension<UserRecord>,
) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok("current user", user.into()))
}
