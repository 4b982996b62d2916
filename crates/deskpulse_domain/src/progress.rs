use std::time::Duration;

/// Progress notifications emitted while a paginated fetch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// A page arrived; `fetched` is the running total kept so far.
    PageFetched { page: usize, fetched: usize },
    /// The server answered 429 and the fetch is about to wait.
    RateLimited { attempt: u32, wait: Duration },
    /// A transport failure is about to be retried after `wait`.
    TransportRetry { wait: Duration, error: String },
    Finished { fetched: usize, complete: bool },
}

pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &FetchEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&FetchEvent) + Send + Sync,
{
    fn on_event(&self, event: &FetchEvent) {
        self(event)
    }
}

/// Observer that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_event(&self, _: &FetchEvent) {}
}
