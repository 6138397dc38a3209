use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

/// Fixed-interval rate limiter: waits a constant delay after each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Sleeps for the configured delay. A zero delay returns immediately.
    pub async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        debug!("Pausing for {:?}", self.delay);
        sleep(self.delay).await;
    }
}
