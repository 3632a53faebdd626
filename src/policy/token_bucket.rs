//! Token bucket rate limiting primitive.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A token bucket that grants permission to proceed or yields a wait.
///
/// Tokens refill lazily from the elapsed monotonic time on every [`take`]
/// call; there is no background timer. One instance is shared across all
/// request tasks behind an `Arc`, with the mutable state guarded by a single
/// mutex so each `take` is one atomic read-modify-write.
///
/// [`take`]: TokenBucket::take
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    fill_rate: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    available: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket holding `burst_size` tokens, refilled at `fill_rate`
    /// tokens per second. The bucket starts full.
    pub fn new(fill_rate: f64, burst_size: u64) -> Self {
        Self {
            capacity: burst_size as f64,
            fill_rate,
            state: Mutex::new(BucketState {
                available: burst_size as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Attempt to take `n` tokens.
    ///
    /// Returns [`Duration::ZERO`] when the tokens were available and have
    /// been deducted. Otherwise returns how long the caller must wait for
    /// `n` tokens to accumulate, deducting nothing; the count never goes
    /// negative.
    pub fn take(&self, n: u64) -> Duration {
        let wanted = n as f64;
        let mut state = self.state.lock().expect("token bucket mutex poisoned");

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.available = (state.available + elapsed * self.fill_rate).min(self.capacity);
        state.last_refill = now;

        if state.available >= wanted {
            state.available -= wanted;
            Duration::ZERO
        } else {
            Duration::from_secs_f64((wanted - state.available) / self.fill_rate)
        }
    }

    /// Current token count after refilling from elapsed time.
    pub fn available(&self) -> f64 {
        let mut state = self.state.lock().expect("token bucket mutex poisoned");

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.available = (state.available + elapsed * self.fill_rate).min(self.capacity);
        state.last_refill = now;

        state.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    // A fill rate slow enough that refill over a test run is negligible.
    const GLACIAL: f64 = 0.0001;

    #[test]
    fn test_take_depletes_monotonically() {
        let bucket = TokenBucket::new(GLACIAL, 3);

        assert_eq!(bucket.take(1), Duration::ZERO);
        assert_eq!(bucket.take(1), Duration::ZERO);
        assert_eq!(bucket.take(1), Duration::ZERO);

        assert!(bucket.take(1) > Duration::ZERO);
        assert!(bucket.available() >= 0.0);
    }

    #[test]
    fn test_insufficient_take_deducts_nothing() {
        let bucket = TokenBucket::new(1.0, 1);
        assert_eq!(bucket.take(1), Duration::ZERO);

        // Empty bucket at 1 token/s: each call reports roughly a one second
        // wait, and repeated calls don't dig the count into debt.
        let first = bucket.take(1);
        let second = bucket.take(1);
        assert!(first >= Duration::from_millis(500) && first <= Duration::from_millis(1500));
        assert!(second <= Duration::from_millis(1500));
        assert!(bucket.available() >= 0.0);
    }

    #[test]
    fn test_refill_is_capped_at_capacity() {
        let bucket = TokenBucket::new(10_000.0, 2);
        assert_eq!(bucket.take(2), Duration::ZERO);

        thread::sleep(Duration::from_millis(20));

        // Far more than 2 tokens' worth of time has passed; only 2 fit.
        assert_eq!(bucket.take(2), Duration::ZERO);
        assert!(bucket.take(1) > Duration::ZERO);
    }

    #[test]
    fn test_token_returns_after_fill_interval() {
        let bucket = TokenBucket::new(100.0, 1);
        assert_eq!(bucket.take(1), Duration::ZERO);

        // 1/R = 10ms; wait twice that.
        thread::sleep(Duration::from_millis(20));
        assert_eq!(bucket.take(1), Duration::ZERO);
    }

    #[test]
    fn test_concurrent_takes_never_over_admit() {
        let bucket = Arc::new(TokenBucket::new(GLACIAL, 100));
        let admitted = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let bucket = bucket.clone();
            let admitted = admitted.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    if bucket.take(1).is_zero() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::Relaxed), 100);
    }
}
