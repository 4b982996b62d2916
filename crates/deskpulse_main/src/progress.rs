use colored::Colorize;
use deskpulse_domain::{FetchEvent, ProgressObserver};

/// Reports fetch progress on stderr so stdout stays clean for the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

pub fn describe(event: &FetchEvent) -> String {
    match event {
        FetchEvent::PageFetched { page, fetched } => {
            format!("Downloading... page {page}, {fetched} conversations")
        }
        FetchEvent::RateLimited { wait, .. } => {
            format!("API busy. Waiting {}s for the rate limit to reset", wait.as_secs())
        }
        FetchEvent::TransportRetry { wait, error } => {
            format!("Connection problem ({error}), retrying in {}ms", wait.as_millis())
        }
        FetchEvent::Finished { fetched, complete: true } => {
            format!("Done: {fetched} conversations")
        }
        FetchEvent::Finished { fetched, complete: false } => {
            format!("Stopped early: {fetched} conversations")
        }
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_event(&self, event: &FetchEvent) {
        let line = describe(event);
        match event {
            FetchEvent::RateLimited { .. } | FetchEvent::TransportRetry { .. } => {
                eprintln!("{}", line.yellow())
            }
            FetchEvent::Finished { complete: false, .. } => eprintln!("{}", line.red()),
            _ => eprintln!("{}", line.dimmed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_describe() {
        let fixture = [
            FetchEvent::PageFetched { page: 2, fetched: 300 },
            FetchEvent::RateLimited { attempt: 0, wait: Duration::from_secs(4) },
            FetchEvent::TransportRetry { wait: Duration::from_millis(400), error: "reset".to_string() },
            FetchEvent::Finished { fetched: 300, complete: false },
        ];

        let actual: Vec<String> = fixture.iter().map(describe).collect();

        let expected = vec![
            "Downloading... page 2, 300 conversations",
            "API busy. Waiting 4s for the rate limit to reset",
            "Connection problem (reset), retrying in 400ms",
            "Stopped early: 300 conversations",
        ];
        assert_eq!(actual, expected);
    }
}
