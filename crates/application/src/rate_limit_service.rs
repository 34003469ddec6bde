//! Rate limiting ports and application service.
//!
//! Implements an in-process fixed-window limiter keyed by
//! `"{identity}:{PLAN}"`. Counters live in a sharded concurrent map and are
//! mutated with atomics, so callers on different keys never contend and
//! callers on the same key never lose an increment.

mod ports;
mod service;


pub use ports::Clock;
pub use service::FixedWindowRateLimiter;
