//! Domain entities and invariants.

#![forbid(unsafe_code)]

pub mod mobile;
mod rate_limit;
mod user;

pub use mobile::{MobilePolicy, ParsedMobile};
pub use rate_limit::{PlanConfig, PlanTable, RateLimitPlan};
pub use user::{EmailAddress, UserId, UserRole, UserType, ambassador_code, validate_password};
