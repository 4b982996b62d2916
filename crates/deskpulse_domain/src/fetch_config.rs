use std::time::Duration;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};

// Page size the search endpoint accepts at most.
const MAX_PER_PAGE: u32 = 150;

// Transport failures tolerated per HTTP call before the fetch gives up.
const MAX_TRANSPORT_RETRIES: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, Setters, PartialEq)]
#[setters(into)]
pub struct FetchConfig {
    /// Records requested per page
    pub per_page: u32,

    /// Pause between successful pages, in milliseconds
    pub page_pause_ms: u64,

    /// Maximum number of retries after a transport failure on a single call
    pub max_transport_retries: usize,

    /// Initial backoff delay in milliseconds for transport retries
    pub initial_backoff_ms: u64,

    /// Backoff multiplication factor for each transport retry
    pub backoff_factor: u32,

    /// Length of one rate-limit "unit" in milliseconds. Reset headers are in
    /// seconds, so this stays at 1000 outside of tests.
    pub time_unit_ms: u64,

    /// Upper bound on the total time one fetch may spend waiting out rate
    /// limits. `None` retries forever.
    pub rate_limit_budget_secs: Option<u64>,
}

impl FetchConfig {
    pub fn page_pause(&self) -> Duration {
        Duration::from_millis(self.page_pause_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    pub fn rate_limit_budget(&self) -> Option<Duration> {
        self.rate_limit_budget_secs.map(Duration::from_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            page_pause_ms: 100,
            max_transport_retries: MAX_TRANSPORT_RETRIES,
            initial_backoff_ms: 200,
            backoff_factor: 2,
            time_unit_ms: 1000,
            rate_limit_budget_secs: None,
        }
    }
}
