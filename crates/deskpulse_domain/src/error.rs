use thiserror::Error;

// NOTE: No blanket `From` for parse errors. Each variant names the setting or
// argument it came from.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No API token found. Please set one of: DESKPULSE_TOKEN or INTERCOM_TOKEN")]
    MissingToken,

    #[error("Invalid URL in {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },

    #[error("Invalid conversation reference: '{0}'")]
    InvalidConversationReference(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Date {0} has no unambiguous local time")]
    AmbiguousLocalTime(chrono::NaiveDateTime),

    #[error("Admin not found: {0}")]
    UnknownAdmin(String),
}

pub type Result<A> = std::result::Result<A, Error>;
