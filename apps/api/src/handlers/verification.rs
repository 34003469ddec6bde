use axum::Json;
use axum::extract::{Extension, State};
use tourism_application::UserRecord;

use crate::dto::{AmbassadorResponse, ApiResponse, UserResponse, VerifyEmailRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/verification/send-email-code - Email a confirmation code.
pub async fn send_email_code_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.auth_service.send_email_verification(user.id).await?;

    Ok(Json(ApiResponse::message("verification code sent to email")))
}

/// POST /api/verification/verify-email
pub async fn verify_email_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(payload): Json<VerifyEmailRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .auth_service
        .verify_email(user.id, &payload.code)
        .await?;

    Ok(Json(ApiResponse::ok("email verified", user.into())))
}

/// POST /api/verification/upgrade-to-ambassador
pub async fn upgrade_to_ambassador_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
) -> ApiResult<Json<ApiResponse<AmbassadorResponse>>> {
    let ambassador_code = state.auth_service.upgrade_to_ambassador(user.id).await?;

    Ok(Json(ApiResponse::ok(
        "upgraded to ambassador",
        AmbassadorResponse { ambassador_code },
    )))
}
