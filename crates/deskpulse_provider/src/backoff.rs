use std::time::Duration;

use backon::ExponentialBuilder;
use deskpulse_domain::FetchConfig;

use crate::{Error, Result};

// Keeps 2^attempt well inside i64 under sustained throttling.
const MAX_EXPONENT: u32 = 16;

/// Time units to wait after a 429 response.
///
/// `reset` is the raw `X-RateLimit-Reset` header (epoch seconds). When it is
/// present and parses, the wait is `reset - now + 1`; otherwise it falls back
/// to `2^attempt + 1`. Either way the result is never below one unit.
pub fn rate_limit_wait(reset: Option<&str>, now: i64, attempt: u32) -> u64 {
    let declared = reset
        .and_then(|reset| reset.trim().parse::<i64>().ok())
        .map(|reset| reset.saturating_sub(now).saturating_add(1));

    let wait = declared.unwrap_or_else(|| (1_i64 << attempt.min(MAX_EXPONENT)) + 1);
    wait.max(1) as u64
}

/// Backoff schedule for transport failures on a single call.
pub(crate) fn transport_backoff(config: &FetchConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(config.initial_backoff())
        .with_factor(config.backoff_factor as f32)
        .with_max_times(config.max_transport_retries)
}

/// Total rate-limit sleeping allowed for one fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitBudget {
    limit: Option<Duration>,
    spent: Duration,
}

impl RateLimitBudget {
    pub fn new(limit: Option<Duration>) -> Self {
        Self { limit, spent: Duration::ZERO }
    }

    /// Reserves `wait` from the budget, failing without reserving anything
    /// when it would overrun the limit.
    pub fn spend(&mut self, wait: Duration) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.spent + wait > limit {
                return Err(Error::RateLimitBudgetExhausted(limit));
            }
        }
        self.spent += wait;
        Ok(())
    }

    pub fn spent(&self) -> Duration {
        self.spent
    }
}
