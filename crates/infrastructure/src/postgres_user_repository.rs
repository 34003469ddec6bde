//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tourism_application::{NewUser, ProfileUpdate, UserRecord, UserRepository};
use tourism_core::{AppError, AppResult};
use tourism_domain::{UserId, UserType};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = r#"
    id, mobile, username, email, password_hash, role, user_type, country_code,
    mobile_number, first_name, last_name, email_verified, ambassador_code,
    verification_code_hash, verification_code_expires_at, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    mobile: String,
    username: String,
    email: Option<String>,
    password_hash: Option<String>,
    role: String,
    user_type: String,
    country_code: String,
    mobile_number: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email_verified: bool,
    ambassador_code: Option<String>,
    verification_code_hash: Option<String>,
    verification_code_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            mobile: row.mobile,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            user_type: row.user_type.parse()?,
            country_code: row.country_code,
            mobile_number: row.mobile_number,
            first_name: row.first_name,
            last_name: row.last_name,
            email_verified: row.email_verified,
            ambassador_code: row.ambassador_code,
            verification_code_hash: row.verification_code_hash,
            verification_code_expires_at: row.verification_code_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

mod account;
mod lookup;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<UserRecord>> {
        self.find_by_mobile_impl(mobile).await
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.find_by_id_impl(user_id).await
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        self.create_impl(user).await
    }

    async fn save_verification_code(
        &self,
        user_id: UserId,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.save_verification_code_impl(user_id, Some(code_hash), Some(expires_at))
            .await
    }

    async fn clear_verification_code(&self, user_id: UserId) -> AppResult<()> {
        self.save_verification_code_impl(user_id, None, None).await
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        self.update_password_impl(user_id, password_hash).await
    }

    async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> AppResult<()> {
        self.update_profile_impl(user_id, update).await
    }

    async fn mark_email_verified(&self, user_id: UserId, user_type: UserType) -> AppResult<()> {
        self.mark_email_verified_impl(user_id, user_type).await
    }

    async fn promote_to_ambassador(
        &self,
        user_id: UserId,
        ambassador_code: &str,
    ) -> AppResult<()> {
        self.promote_to_ambassador_impl(user_id, ambassador_code)
            .await
    }
}

fn mobile_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("an account with this mobile number already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

fn ensure_updated(rows_affected: u64, user_id: UserId) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
    }

    Ok(())
}

#[cfg(test)]
mod tests;
