//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_email_sender;
mod console_sms_sender;
mod in_memory_user_repository;
mod jwt_token_issuer;
mod postgres_user_repository;
mod system_clock;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use console_email_sender::ConsoleEmailSender;
pub use console_sms_sender::ConsoleSmsSender;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use jwt_token_issuer::{JwtTokenIssuer, MIN_SECRET_LENGTH};
pub use postgres_user_repository::PostgresUserRepository;
pub use system_clock::SystemClock;
