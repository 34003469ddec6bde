//! Named rate limit plans and their fixed-window budgets.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use tourism_core::{AppError, AppResult};

/// Named rate limit policy consulted by the auth endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitPlan {
    /// One-time code issuance.
    Otp,
    /// Code verification and password login.
    Login,
    /// Any other API request.
    General,
}

impl RateLimitPlan {
    /// All plans, in table order.
    pub const ALL: [Self; 3] = [Self::Otp, Self::Login, Self::General];

    /// Returns the name used in counter keys and configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Otp => "OTP",
            Self::Login => "LOGIN",
            Self::General => "GENERAL",
        }
    }
}

impl Display for RateLimitPlan {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for RateLimitPlan {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "OTP" => Ok(Self::Otp),
            "LOGIN" => Ok(Self::Login),
            "GENERAL" => Ok(Self::General),
            _ => Err(AppError::Validation(format!(
                "unknown rate limit plan '{value}'"
            ))),
        }
    }
}

/// Request budget of a plan: at most `max_requests` per fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConfig {
    max_requests: u32,
    window: Duration,
}

impl PlanConfig {
    /// Creates a validated plan budget.
    pub fn new(max_requests: u32, window: Duration) -> AppResult<Self> {
        if max_requests == 0 {
            return Err(AppError::Validation(
                "max_requests must be greater than zero".to_owned(),
            ));
        }

        if window.as_millis() == 0 {
            return Err(AppError::Validation(
                "rate limit window must be at least one millisecond".to_owned(),
            ));
        }

        Ok(Self {
            max_requests,
            window,
        })
    }

    /// Returns the number of requests admitted per window.
    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Returns the window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the window length in whole milliseconds.
    #[must_use]
    pub fn window_ms(&self) -> u64 {
        u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Budget for every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTable {
    otp: PlanConfig,
    login: PlanConfig,
    general: PlanConfig,
}

impl PlanTable {
    /// Creates a table from explicit budgets.
    #[must_use]
    pub fn new(otp: PlanConfig, login: PlanConfig, general: PlanConfig) -> Self {
        Self {
            otp,
            login,
            general,
        }
    }

    /// Returns the budget of a plan.
    #[must_use]
    pub fn config(&self, plan: RateLimitPlan) -> PlanConfig {
        match plan {
            RateLimitPlan::Otp => self.otp,
            RateLimitPlan::Login => self.login,
            RateLimitPlan::General => self.general,
        }
    }

    /// Returns a copy of the table with one plan replaced.
    #[must_use]
    pub fn with(mut self, plan: RateLimitPlan, config: PlanConfig) -> Self {
        match plan {
            RateLimitPlan::Otp => self.otp = config,
            RateLimitPlan::Login => self.login = config,
            RateLimitPlan::General => self.general = config,
        }
        self
    }
}

impl Default for PlanTable {
    /// OTP: 10/min, LOGIN: 5/min, GENERAL: 30/min.
    fn default() -> Self {
        const MINUTE: Duration = Duration::from_secs(60);

        Self {
            otp: PlanConfig {
                max_requests: 10,
                window: MINUTE,
            },
            login: PlanConfig {
                max_requests: 5,
                window: MINUTE,
            },
            general: PlanConfig {
                max_requests: 30,
                window: MINUTE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_published_limits() {
        let table = PlanTable::default();
        assert_eq!(table.config(RateLimitPlan::Otp).max_requests(), 10);
        assert_eq!(table.config(RateLimitPlan::Login).max_requests(), 5);
        assert_eq!(table.config(RateLimitPlan::General).max_requests(), 30);
        for plan in RateLimitPlan::ALL {
            assert_eq!(table.config(plan).window_ms(), 60_000);
        }
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(PlanConfig::new(0, Duration::from_secs(1)).is_err());
        assert!(PlanConfig::new(1, Duration::ZERO).is_err());
        assert!(PlanConfig::new(1, Duration::from_micros(10)).is_err());
    }

    #[test]
    fn with_replaces_a_single_plan() -> AppResult<()> {
        let custom = PlanConfig::new(2, Duration::from_millis(500))?;
        let table = PlanTable::default().with(RateLimitPlan::Login, custom);
        assert_eq!(table.config(RateLimitPlan::Login), custom);
        assert_eq!(table.config(RateLimitPlan::Otp).max_requests(), 10);
        Ok(())
    }

    #[test]
    fn plan_names_round_trip() {
        for plan in RateLimitPlan::ALL {
            assert_eq!(plan.as_str().parse::<RateLimitPlan>().ok(), Some(plan));
        }
        assert_eq!("otp".parse::<RateLimitPlan>().ok(), Some(RateLimitPlan::Otp));
        assert!("burst".parse::<RateLimitPlan>().is_err());
    }
}
