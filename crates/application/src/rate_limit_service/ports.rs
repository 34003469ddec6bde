/// Time source consulted by the rate limiter.
///
/// Implementations must never go backwards. Tests inject a manual clock to
/// step across window boundaries deterministically.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since an arbitrary, fixed origin.
    fn now_millis(&self) -> u64;
}
