mod backoff;
mod client;
mod error;
mod fetcher;
mod gate;
mod transport;
mod utils;
mod webhook;

pub use backoff::{rate_limit_wait, RateLimitBudget};
pub use client::HelpdeskClient;
pub use error::*;
pub use fetcher::{FetchOutcome, RateLimitedFetcher};
pub use gate::RateGate;
pub use transport::{HttpReply, HttpRequest, HttpTransport, Method, Transport};
pub use webhook::SlackNotifier;

#[cfg(test)]
mod mock;
