use std::sync::Arc;
use std::time::Instant;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};
use crate::rate_limit::RateLimiter;

// Sweeper - drops expired rate records so the map doesn't grow forever.
// Correctness never depends on it, check() resets stale records itself.
pub async fn sweeper(limiter: Arc<RateLimiter>, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(every = ?every, "rate limit sweeper started");

    loop {
        interval.tick().await;

        let removed = limiter.sweep(Instant::now());
        if removed > 0 {
            debug!(removed, remaining = limiter.len(), "evicted expired rate records");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimitConfig;

    #[tokio::test]
    async fn sweeper_evicts_expired_records() {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            window: Duration::from_millis(20),
            max_requests: 5,
            standard_headers: true,
        }));
        limiter.check("10.0.0.1", Instant::now());
        limiter.check("10.0.0.2", Instant::now());
        assert_eq!(limiter.len(), 2);

        let task = tokio::spawn(sweeper(Arc::clone(&limiter), Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(150)).await;
        task.abort();

        assert!(limiter.is_empty());
    }
}
