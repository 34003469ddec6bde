//! Application services and ports.

#![forbid(unsafe_code)]

mod auth_service;
mod rate_limit_service;

pub use auth_service::{
    AuthPorts, AuthService, AuthSession, AuthSettings, EmailSender, LoginOptions, NewUser,
    OtpGenerator, PasswordHasher, ProfileUpdate, RandomOtpGenerator, RegistrationDetails,
    SmsSender, TokenIssuer, UserRecord, UserRepository,
};
pub use rate_limit_service::{Clock, FixedWindowRateLimiter};
