use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tourism_core::{AppError, AppResult};
use tourism_domain::{PlanTable, RateLimitPlan};
use tracing::debug;

use super::ports::Clock;

/// Request counter for one `(identity, plan)` pair.
#[derive(Debug)]
struct RateCounter {
    count: AtomicU64,
    window_start_ms: AtomicU64,
    window_ms: u64,
}

impl RateCounter {
    fn new(now_ms: u64, window_ms: u64) -> Self {
        Self {
            count: AtomicU64::new(0),
            window_start_ms: AtomicU64::new(now_ms),
            window_ms,
        }
    }

    /// Counts one request and reports whether it fits the budget.
    ///
    /// An expired window is reset by exactly one caller: the one whose
    /// compare-exchange moves `window_start_ms` forward.
    ///
    /// At the boundary an increment from a concurrent caller can land
    /// between that compare-exchange and the reset of `count` and be
    /// overwritten. The new window then undercounts by at most the number
    /// of such callers, so the error admits extra requests and never
    /// rejects one that fits.
    fn try_increment(&self, now_ms: u64, max_requests: u32) -> bool {
        let window_start = self.window_start_ms.load(Ordering::Acquire);

        if now_ms.saturating_sub(window_start) > self.window_ms
            && self
                .window_start_ms
                .compare_exchange(window_start, now_ms, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            self.count.store(0, Ordering::Release);
        }

        let count = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        count <= u64::from(max_requests)
    }

    fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.window_start_ms.load(Ordering::Acquire)) > self.window_ms
    }
}

/// In-memory fixed-window admission control.
///
/// Cheap to clone; clones share the same counters.
#[derive(Clone)]
pub struct FixedWindowRateLimiter {
    counters: Arc<DashMap<String, Arc<RateCounter>>>,
    plans: PlanTable,
    clock: Arc<dyn Clock>,
}

impl FixedWindowRateLimiter {
    /// Creates a limiter with the given plan budgets and time source.
    #[must_use]
    pub fn new(plans: PlanTable, clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
            plans,
            clock,
        }
    }

    /// Returns the plan budgets this limiter enforces.
    #[must_use]
    pub fn plans(&self) -> &PlanTable {
        &self.plans
    }

    /// Counts a request for `identity` under `plan` and reports whether it
    /// is admitted.
    ///
    /// Rejected requests still consume a slot. An empty identity is never
    /// admitted and leaves no counter behind.
    pub fn try_consume(&self, identity: &str, plan: RateLimitPlan) -> bool {
        if identity.is_empty() {
            debug!(%plan, "rejecting rate limit check for empty identity");
            return false;
        }

        let config = self.plans.config(plan);
        let now_ms = self.clock.now_millis();
        let counter = self.counter_for(counter_key(identity, plan), now_ms, config.window_ms());

        let allowed = counter.try_increment(now_ms, config.max_requests());
        if !allowed {
            debug!(identity, %plan, "rate limit exceeded");
        }

        allowed
    }

    /// Same as [`Self::try_consume`], reporting rejection as
    /// `AppError::RateLimited`.
    pub fn check_rate_limit(&self, identity: &str, plan: RateLimitPlan) -> AppResult<()> {
        if self.try_consume(identity, plan) {
            return Ok(());
        }

        let window_seconds = self.plans.config(plan).window().as_secs().max(1);
        Err(AppError::RateLimited(format!(
            "too many requests, please try again in {window_seconds} seconds"
        )))
    }

    /// Forgets the counter for `identity` under `plan`.
    pub fn clear_rate_limit(&self, identity: &str, plan: RateLimitPlan) {
        self.counters.remove(&counter_key(identity, plan));
    }

    /// Removes every counter whose window has elapsed. Returns the number
    /// of removed counters.
    pub fn sweep_expired(&self) -> usize {
        let now_ms = self.clock.now_millis();
        let mut removed = 0;

        self.counters.retain(|_, counter| {
            let keep = !counter.is_expired(now_ms);
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    /// Returns the number of live counters.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.counters.len()
    }

    fn counter_for(&self, key: String, now_ms: u64, window_ms: u64) -> Arc<RateCounter> {
        if let Some(existing) = self.counters.get(&key) {
            return Arc::clone(existing.value());
        }

        Arc::clone(
            self.counters
                .entry(key)
                .or_insert_with(|| Arc::new(RateCounter::new(now_ms, window_ms)))
                .value(),
        )
    }
}

fn counter_key(identity: &str, plan: RateLimitPlan) -> String {
    format!("{identity}:{plan}")
}
