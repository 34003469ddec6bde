//! Shared primitives for all Rust crates in the tourism backend.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across tourism crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated or presented bad credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but the operation is not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Caller exhausted the request budget of a rate limit plan.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
