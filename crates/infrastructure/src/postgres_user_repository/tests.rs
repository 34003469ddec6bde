use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tourism_application::{NewUser, ProfileUpdate, UserRepository};
use tourism_core::AppError;
use tourism_domain::{UserId, UserType};

use super::PostgresUserRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres user tests: {error}");
    }

    Some(pool)
}

fn unique_mobile() -> String {
    let suffix = UserId::new().as_uuid().as_u128() % 1_000_000_000;
    format!("9{suffix:09}")
}

#[tokio::test]
async fn create_then_find_round_trips_a_guest() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserRepository::new(pool);
    let mobile = unique_mobile();

    let created = match repository
        .create(NewUser {
            mobile: mobile.clone(),
            country_code: "98".to_owned(),
            mobile_number: mobile.clone(),
        })
        .await
    {
        Ok(created) => created,
        Err(error) => panic!("create failed: {error}"),
    };
    assert_eq!(created.user_type, UserType::Guest);
    assert_eq!(created.username, mobile);

    let found = repository.find_by_mobile(&mobile).await;
    assert!(matches!(found, Ok(Some(ref user)) if user.id == created.id));

    let duplicate = repository
        .create(NewUser {
            mobile: mobile.clone(),
            country_code: "98".to_owned(),
            mobile_number: mobile,
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn profile_update_only_touches_provided_fields() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserRepository::new(pool);
    let mobile = unique_mobile();
    let Ok(created) = repository
        .create(NewUser {
            mobile: mobile.clone(),
            country_code: "98".to_owned(),
            mobile_number: mobile.clone(),
        })
        .await
    else {
        panic!("create failed");
    };

    assert!(repository.update_password(created.id, "hash-1").await.is_ok());
    assert!(
        repository
            .update_profile(
                created.id,
                ProfileUpdate {
                    username: Some("sara".to_owned()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .is_ok()
    );

    let Ok(Some(user)) = repository.find_by_id(created.id).await else {
        panic!("user should exist");
    };
    assert_eq!(user.username, "sara");
    assert_eq!(user.password_hash.as_deref(), Some("hash-1"));
    assert_eq!(user.email, None);
}

#[tokio::test]
async fn updating_missing_user_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserRepository::new(pool);
    let result = repository.clear_verification_code(UserId::new()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn email_verification_and_promotion_persist() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserRepository::new(pool);
    let mobile = unique_mobile();
    let Ok(created) = repository
        .create(NewUser {
            mobile: mobile.clone(),
            country_code: "98".to_owned(),
            mobile_number: mobile.clone(),
        })
        .await
    else {
        panic!("create failed");
    };

    let with_email = |email: &str| ProfileUpdate {
        email: Some(email.to_owned()),
        first_name: Some("Sara".to_owned()),
        ..ProfileUpdate::default()
    };

    assert!(
        repository
            .update_profile(created.id, with_email("sara@example.com"))
            .await
            .is_ok()
    );
    assert!(
        repository
            .mark_email_verified(created.id, UserType::Verified)
            .await
            .is_ok()
    );
    let code = format!("AMB_SARA_{mobile}");
    assert!(repository.promote_to_ambassador(created.id, &code).await.is_ok());

    let Ok(Some(user)) = repository.find_by_id(created.id).await else {
        panic!("user should exist");
    };
    assert!(user.email_verified);
    assert_eq!(user.user_type, UserType::Ambassador);
    assert_eq!(user.ambassador_code.as_deref(), Some(code.as_str()));
    assert_eq!(user.first_name.as_deref(), Some("Sara"));

    assert!(
        repository
            .update_profile(created.id, with_email("sara@elsewhere.org"))
            .await
            .is_ok()
    );
    let Ok(Some(changed)) = repository.find_by_id(created.id).await else {
        panic!("user should exist");
    };
    assert!(!changed.email_verified);
}
