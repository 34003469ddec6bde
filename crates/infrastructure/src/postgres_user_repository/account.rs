use tourism_domain::{UserRole, UserType};

use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_impl(&self, user: NewUser) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, mobile, username, role, user_type, country_code, mobile_number)
            VALUES ($1, $2, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(UserId::new().as_uuid())
        .bind(&user.mobile)
        .bind(UserRole::User.as_str())
        .bind(UserType::Guest.as_str())
        .bind(&user.country_code)
        .bind(&user.mobile_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| mobile_conflict_or_internal(error, "create user"))?;

        UserRecord::try_from(row)
    }

    pub(super) async fn save_verification_code_impl(
        &self,
        user_id: UserId,
        code_hash: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verification_code_hash = $2,
                verification_code_expires_at = $3,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to store verification code: {error}"))
        })?;

        ensure_updated(result.rows_affected(), user_id)
    }

    pub(super) async fn update_password_impl(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update password: {error}")))?;

        ensure_updated(result.rows_affected(), user_id)
    }

    pub(super) async fn update_profile_impl(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> AppResult<()> {
        // NULL parameters keep the current column value.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email_verified = email_verified AND ($3::TEXT IS NULL OR $3 = email),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                first_name = COALESCE($5, first_name),
                last_name = COALESCE($6, last_name),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(update.username)
        .bind(update.email)
        .bind(update.password_hash)
        .bind(update.first_name)
        .bind(update.last_name)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update profile: {error}")))?;

        ensure_updated(result.rows_affected(), user_id)
    }

    pub(super) async fn mark_email_verified_impl(
        &self,
        user_id: UserId,
        user_type: UserType,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verified = TRUE,
                user_type = $2,
                verification_code_hash = NULL,
                verification_code_expires_at = NULL,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(user_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to mark email verified: {error}")))?;

        ensure_updated(result.rows_affected(), user_id)
    }

    pub(super) async fn promote_to_ambassador_impl(
        &self,
        user_id: UserId,
        ambassador_code: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET user_type = $2, ambassador_code = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(UserType::Ambassador.as_str())
        .bind(ambassador_code)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to promote user to ambassador: {error}"))
        })?;

        ensure_updated(result.rows_affected(), user_id)
    }
}
