use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use tourism_core::AppError;
use tourism_domain::{MobilePolicy, PlanConfig, PlanTable, RateLimitPlan};
use tourism_infrastructure::MIN_SECRET_LENGTH;
use tracing_subscriber::EnvFilter;

/// Upper bound for `OTP_TTL_SECONDS`.
const MAX_OTP_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Runtime configuration read from the process environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub jwt_secret: String,
    pub jwt_expiration: chrono::Duration,
    pub otp_ttl: chrono::Duration,
    pub mobile_policy: MobilePolicy,
    pub rate_limit_plans: PlanTable,
    pub rate_limit_sweep_interval: Duration,
    /// Take the client address for rate limiting from `x-forwarded-for`.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::from_lookup(|name| env::var(name).ok())?;
        config.migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").filter(|value| !value.trim().is_empty());
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| AppError::Validation("JWT_SECRET is required".to_owned()))?;
        if jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or(&lookup, "API_PORT", 3001_u16)?;

        let jwt_expiration = seconds(&lookup, "JWT_EXPIRATION_SECONDS", 86_400)?;
        if jwt_expiration <= chrono::TimeDelta::zero() {
            return Err(AppError::Validation(
                "JWT_EXPIRATION_SECONDS must be positive".to_owned(),
            ));
        }

        let otp_ttl = seconds(&lookup, "OTP_TTL_SECONDS", 120)?;
        if otp_ttl <= chrono::TimeDelta::zero()
            || otp_ttl > chrono::TimeDelta::seconds(MAX_OTP_TTL_SECONDS)
        {
            return Err(AppError::Validation(format!(
                "OTP_TTL_SECONDS must be between 1 and {MAX_OTP_TTL_SECONDS}"
            )));
        }

        let mobile_policy = match lookup("MOBILE_POLICY") {
            Some(name) => MobilePolicy::from_name(&name)?,
            None => MobilePolicy::permissive(),
        };

        let rate_limit_plans = load_plan_table(&lookup)?;
        let rate_limit_sweep_interval =
            Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_SWEEP_SECONDS", 300_u64)?.max(1));
        let trust_forwarded_for = parse_or(&lookup, "TRUST_FORWARDED_FOR", false)?;

        Ok(Self {
            migrate_only: false,
            database_url,
            frontend_url,
            api_host,
            api_port,
            jwt_secret,
            jwt_expiration,
            otp_ttl,
            mobile_policy,
            rate_limit_plans,
            rate_limit_sweep_interval,
            trust_forwarded_for,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Applies `RATE_LIMIT_{PLAN}_MAX` and `RATE_LIMIT_{PLAN}_WINDOW_MS` overrides.
fn load_plan_table(lookup: &impl Fn(&str) -> Option<String>) -> Result<PlanTable, AppError> {
    let mut plans = PlanTable::default();

    for plan in RateLimitPlan::ALL {
        let defaults = plans.config(plan);
        let max_requests = parse_or(
            lookup,
            &format!("RATE_LIMIT_{plan}_MAX"),
            defaults.max_requests(),
        )?;
        let window_ms = parse_or(
            lookup,
            &format!("RATE_LIMIT_{plan}_WINDOW_MS"),
            defaults.window_ms(),
        )?;

        plans = plans.with(
            plan,
            PlanConfig::new(max_requests, Duration::from_millis(window_ms))?,
        );
    }

    Ok(plans)
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: i64,
) -> Result<chrono::TimeDelta, AppError> {
    let value = parse_or(lookup, name, default)?;
    chrono::TimeDelta::try_seconds(value)
        .ok_or_else(|| AppError::Validation(format!("{name} is out of range")))
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
