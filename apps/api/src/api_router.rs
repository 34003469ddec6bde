use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tourism_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, health, verification};
use crate::middleware;
use crate::state::AppState;

mod cors;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route(
            "/api/auth/set-initial-password",
            post(auth::set_initial_password_handler),
        )
        .route(
            "/api/auth/complete-registration",
            post(auth::complete_registration_handler),
        )
        .route(
            "/api/verification/send-email-code",
            post(verification::send_email_code_handler),
        )
        .route(
            "/api/verification/verify-email",
            post(verification::verify_email_handler),
        )
        .route(
            "/api/verification/upgrade-to-ambassador",
            post(verification::upgrade_to_ambassador_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_bearer,
        ));

    let api_routes = Router::new()
        .route("/api/auth/init-login", post(auth::init_login_handler))
        .route(
            "/api/auth/send-verification",
            post(auth::send_verification_handler),
        )
        .route("/api/auth/verify-code", post(auth::verify_code_handler))
        .route(
            "/api/auth/login-password",
            post(auth::login_password_handler),
        )
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::general_rate_limit,
        ));

    Ok(Router::new()
        .route("/health", get(health::health_handler))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
