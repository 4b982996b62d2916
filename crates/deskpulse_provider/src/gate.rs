use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Rate-limit state shared by every fetch created from the same client.
///
/// A 429 seen by one fetch closes the gate until the reset time, and every
/// other fetch waits for it before sending its next request.
#[derive(Clone, Default)]
pub struct RateGate {
    blocked_until: Arc<Mutex<Option<Instant>>>,
}

impl RateGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the gate is open. Returns immediately when it already is.
    pub async fn wait_turn(&self) {
        let until = *self.blocked_until.lock().await;
        if let Some(until) = until {
            if until > Instant::now() {
                debug!(wait_ms = %(until - Instant::now()).as_millis(), "Waiting for rate limit gate");
                tokio::time::sleep_until(until).await;
            }
        }
    }

    /// Closes the gate for `wait` from now. Never shortens an existing block.
    pub async fn block_for(&self, wait: Duration) {
        let until = Instant::now() + wait;
        let mut guard = self.blocked_until.lock().await;
        *guard = Some(guard.map_or(until, |current| current.max(until)));
    }

    #[cfg(test)]
    pub(crate) async fn is_open(&self) -> bool {
        self.blocked_until
            .lock()
            .await
            .map_or(true, |until| until <= Instant::now())
    }
}
