use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Single-slot gate keeping job starts at least `interval` apart.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_start: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reserve the next start slot and return how long to wait for it,
    /// measured from `now`. The first slot is free.
    pub fn acquire(&mut self, now: Instant) -> Duration {
        let slot = match self.last_start {
            Some(last) => (last + self.interval).max(now),
            None => now,
        };
        self.last_start = Some(slot);
        slot - now
    }

    /// Wait until the next slot is reached.
    pub async fn until_ready(&mut self) -> Duration {
        let wait = self.acquire(Instant::now());
        if !wait.is_zero() {
            sleep(wait).await;
        }
        wait
    }
}
