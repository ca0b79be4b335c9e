// file: src/reddit/throttle.rs
// description: pauses collection after a fixed number of api calls

use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

/// Counts calls and sleeps for `pause` once `limit` is reached, then starts over.
///
/// The lock is held across the sleep, so concurrent callers block until the
/// pause ends.
pub struct ApiCallThrottle {
    limit: usize,
    pause: Duration,
    count: Mutex<usize>,
}

impl ApiCallThrottle {
    pub fn new(limit: usize, pause: Duration) -> Self {
        Self {
            limit: limit.max(1),
            pause,
            count: Mutex::new(0),
        }
    }

    /// Record one call; returns true when this call triggered a pause.
    pub async fn record_call(&self) -> bool {
        let mut count = self.count.lock().await;
        *count += 1;

        if *count < self.limit {
            return false;
        }

        warn!(
            "Reached {} API calls. Pausing for {} seconds...",
            self.limit,
            self.pause.as_secs()
        );
        tokio::time::sleep(self.pause).await;
        *count = 0;
        true
    }

    pub async fn calls_since_pause(&self) -> usize {
        *self.count.lock().await
    }
}
