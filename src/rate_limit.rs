use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Enforces a minimum wall-clock spacing between consecutive calls.
///
/// The first call goes through immediately. Any later call that arrives
/// before `interval` has elapsed since the previous one waits for the
/// remainder.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the next call may proceed.
    fn wait_time(&self, now: Instant) -> Duration {
        match self.last_call {
            Some(last) => self.interval.saturating_sub(now.duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Block until a call is allowed, then record it.
    pub async fn acquire(&mut self) {
        let wait = self.wait_time(Instant::now());
        if !wait.is_zero() {
            debug!("Rate limiter: waiting {:?} before next call", wait);
            sleep(wait).await;
        }
        self.last_call = Some(Instant::now());
    }
}
