//! In-memory user store used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tourism_application::{NewUser, ProfileUpdate, UserRecord, UserRepository};
use tourism_core::{AppError, AppResult};
use tourism_domain::{UserId, UserRole, UserType};

/// User repository keyed by canonical mobile.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify(
        &self,
        user_id: UserId,
        apply: impl FnOnce(&mut UserRecord) + Send,
    ) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        apply(user);
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(mobile).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.id == user_id).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.mobile) {
            return Err(AppError::Conflict(
                "an account with this mobile number already exists".to_owned(),
            ));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: UserId::new(),
            mobile: user.mobile.clone(),
            username: user.mobile.clone(),
            email: None,
            password_hash: None,
            role: UserRole::User,
            user_type: UserType::Guest,
            country_code: user.country_code,
            mobile_number: user.mobile_number,
            first_name: None,
            last_name: None,
            email_verified: false,
            ambassador_code: None,
            verification_code_hash: None,
            verification_code_expires_at: None,
            created_at: now,
            updated_at: now,
        };

        users.insert(user.mobile, record.clone());
        Ok(record)
    }

    async fn save_verification_code(
        &self,
        user_id: UserId,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let code_hash = code_hash.to_owned();
        self.modify(user_id, move |user| {
            user.verification_code_hash = Some(code_hash);
            user.verification_code_expires_at = Some(expires_at);
        })
        .await
    }

    async fn clear_verification_code(&self, user_id: UserId) -> AppResult<()> {
        self.modify(user_id, |user| {
            user.verification_code_hash = None;
            user.verification_code_expires_at = None;
        })
        .await
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let password_hash = password_hash.to_owned();
        self.modify(user_id, move |user| user.password_hash = Some(password_hash))
            .await
    }

    async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> AppResult<()> {
        self.modify(user_id, move |user| {
            if let Some(username) = update.username {
                user.username = username;
            }
            if let Some(email) = update.email {
                if user.email.as_ref() != Some(&email) {
                    user.email_verified = false;
                }
                user.email = Some(email);
            }
            if update.password_hash.is_some() {
                user.password_hash = update.password_hash;
            }
            if update.first_name.is_some() {
                user.first_name = update.first_name;
            }
            if update.last_name.is_some() {
                user.last_name = update.last_name;
            }
        })
        .await
    }

    async fn mark_email_verified(&self, user_id: UserId, user_type: UserType) -> AppResult<()> {
        self.modify(user_id, move |user| {
            user.email_verified = true;
            user.user_type = user_type;
            user.verification_code_hash = None;
            user.verification_code_expires_at = None;
        })
        .await
    }

    async fn promote_to_ambassador(
        &self,
        user_id: UserId,
        ambassador_code: &str,
    ) -> AppResult<()> {
        let ambassador_code = ambassador_code.to_owned();
        self.modify(user_id, move |user| {
            user.user_type = UserType::Ambassador;
            user.ambassador_code = Some(ambassador_code);
        })
        .await
    }
}
