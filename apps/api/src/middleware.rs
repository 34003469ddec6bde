use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use tourism_core::AppError;
use tourism_domain::RateLimitPlan;

use crate::error::ApiResult;
use crate::state::AppState;

/// Identity used when neither the peer address nor a trusted forwarding
/// header is available.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// Applies the `GENERAL` plan per client address.
pub async fn general_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| *address);
    let client = client_identity(request.headers(), peer, state.trust_forwarded_for);
    state
        .rate_limiter
        .check_rate_limit(&client, RateLimitPlan::General)?;

    Ok(next.run(request).await)
}

/// Resolves the bearer token to a user and stores it as a request extension.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())?;
    let user = state.auth_service.current_user(token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Rate limit identity of a request.
///
/// The first `x-forwarded-for` hop counts only when `trust_forwarded` is
/// set and it parses as an IP address. Otherwise the peer IP is used, and
/// [`ANONYMOUS_CLIENT`] when the server runs without connect info.
pub fn client_identity(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded: bool,
) -> String {
    let forwarded = trust_forwarded
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok());

    match forwarded.or(peer.map(|address| address.ip())) {
        Some(ip) => ip.to_string(),
        None => ANONYMOUS_CLIENT.to_owned(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
}
