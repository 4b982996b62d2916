use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced an HTTP response, or the body could not be
    /// read.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// A 200 response whose body was not the JSON we expected.
    #[error("Failed to decode response body: {0}")]
    Decode(serde_json::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),

    /// Any status other than 200 and 429.
    #[error("Remote error {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Rate limit budget of {}s exhausted", .0.as_secs())]
    RateLimitBudgetExhausted(Duration),

    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    #[error("Invalid URL: {0}")]
    Url(url::ParseError),

    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Webhook delivery failed: {0}")]
    Webhook(String),
}

impl Error {
    /// Failures worth repeating the same request for. Malformed bodies count
    /// as transport failures.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Decode(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<A> = std::result::Result<A, Error>;
