use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tourism_application::{
    AuthPorts, AuthService, AuthSettings, FixedWindowRateLimiter, RandomOtpGenerator,
    UserRepository,
};
use tourism_core::AppError;
use tourism_infrastructure::{
    Argon2PasswordHasher, ConsoleEmailSender, ConsoleSmsSender, InMemoryUserRepository,
    JwtTokenIssuer, PostgresUserRepository, SystemClock,
};
use tracing::{debug, info, warn};

use crate::api_config::ApiConfig;
use crate::state::AppState;

const TOKEN_ISSUER: &str = "tourism-api";

/// Outcome of service construction.
pub enum Startup {
    /// Migrations ran and the process should exit.
    MigratedOnly,
    /// Services are ready to serve.
    Serve(AppState),
}

pub async fn build_app_state(config: &ApiConfig) -> Result<Startup, AppError> {
    let user_repository = match build_user_repository(config).await? {
        Some(repository) => repository,
        None => return Ok(Startup::MigratedOnly),
    };

    let rate_limiter =
        FixedWindowRateLimiter::new(config.rate_limit_plans, Arc::new(SystemClock::new()));

    let auth_service = AuthService::new(
        AuthPorts {
            user_repository,
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
            token_issuer: Arc::new(JwtTokenIssuer::new(
                &config.jwt_secret,
                TOKEN_ISSUER,
                config.jwt_expiration,
            )?),
            sms_sender: Arc::new(ConsoleSmsSender::new()),
            email_sender: Arc::new(ConsoleEmailSender::new()),
            otp_generator: Arc::new(RandomOtpGenerator),
        },
        rate_limiter,
        AuthSettings {
            mobile_policy: config.mobile_policy.clone(),
            otp_ttl: config.otp_ttl,
        },
    );

    Ok(Startup::Serve(AppState::new(
        auth_service,
        config.trust_forwarded_for,
    )))
}

/// Returns `None` when only migrations were requested.
async fn build_user_repository(
    config: &ApiConfig,
) -> Result<Option<Arc<dyn UserRepository>>, AppError> {
    let Some(database_url) = config.database_url.as_deref() else {
        if config.migrate_only {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        warn!("DATABASE_URL is not set, users are kept in memory");
        return Ok(Some(Arc::new(InMemoryUserRepository::new())));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(None);
    }

    Ok(Some(Arc::new(PostgresUserRepository::new(pool))))
}

/// Periodically drops counters whose window has elapsed.
pub fn spawn_rate_limit_sweeper(rate_limiter: FixedWindowRateLimiter, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = rate_limiter.sweep_expired();
            debug!(
                removed,
                remaining = rate_limiter.tracked_keys(),
                "rate limit sweep"
            );
        }
    });
}
