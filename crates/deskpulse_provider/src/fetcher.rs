use std::sync::Arc;

use backon::Retryable;
use chrono::Utc;
use deskpulse_domain::{
    Conversation, FetchConfig, FetchEvent, Pagination, ProgressObserver, SearchPage, SearchQuery,
    SearchRequest,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::backoff::{rate_limit_wait, transport_backoff};
use crate::{Error, HttpRequest, RateGate, RateLimitBudget, Result, Transport};

pub(crate) const SEARCH_PATH: &str = "conversations/search";

/// Everything a paginated fetch managed to collect.
///
/// `failure` is set when the fetch stopped before the last page; `records`
/// then holds every record from the pages that did arrive.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<Conversation>,
    pub pages: usize,
    pub failure: Option<Error>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Discards partial results.
    pub fn into_result(self) -> Result<Vec<Conversation>> {
        match self.failure {
            Some(error) => Err(error),
            None => Ok(self.records),
        }
    }
}

enum Reply<R> {
    Success(R),
    RateLimited(Option<String>),
    Rejected { status: u16, body: String },
}

/// Drives the search endpoint page by page, waiting out 429 responses and
/// retrying transport failures.
pub struct RateLimitedFetcher<T> {
    transport: Arc<T>,
    config: FetchConfig,
    gate: RateGate,
}

impl<T: Transport> RateLimitedFetcher<T> {
    pub fn new(transport: Arc<T>, config: FetchConfig, gate: RateGate) -> Self {
        Self { transport, config, gate }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub async fn fetch_all(
        &self,
        query: &SearchQuery,
        observer: &dyn ProgressObserver,
    ) -> FetchOutcome {
        self.fetch_matching(query, |_| true, observer).await
    }

    /// Like [`Self::fetch_all`], keeping only records for which `keep` holds.
    /// Pagination still walks every page.
    pub async fn fetch_matching<F>(
        &self,
        query: &SearchQuery,
        keep: F,
        observer: &dyn ProgressObserver,
    ) -> FetchOutcome
    where
        F: Fn(&Conversation) -> bool,
    {
        let mut outcome = FetchOutcome::default();
        let mut budget = RateLimitBudget::new(self.config.rate_limit_budget());
        let mut pagination = Pagination::new(self.config.per_page);

        loop {
            let page = match self.search_page(query, &pagination, &mut budget, observer).await {
                Ok(page) => page,
                Err(error) => {
                    warn!(
                        error = %error,
                        pages = outcome.pages,
                        fetched = outcome.records.len(),
                        "Fetch stopped early, keeping partial result"
                    );
                    outcome.failure = Some(error);
                    break;
                }
            };

            outcome.pages += 1;
            let next = page.next_cursor().cloned();
            let total = page.total_count;
            outcome
                .records
                .extend(page.conversations.into_iter().filter(|record| keep(record)));

            debug!(page = outcome.pages, fetched = outcome.records.len(), total = ?total, "Page fetched");
            observer.on_event(&FetchEvent::PageFetched {
                page: outcome.pages,
                fetched: outcome.records.len(),
            });

            match next {
                Some(cursor) => {
                    pagination.starting_after = Some(cursor);
                    tokio::time::sleep(self.config.page_pause()).await;
                }
                None => break,
            }
        }

        info!(
            pages = outcome.pages,
            fetched = outcome.records.len(),
            complete = outcome.is_complete(),
            rate_limited_secs = budget.spent().as_secs_f64(),
            "Fetch finished"
        );
        observer.on_event(&FetchEvent::Finished {
            fetched: outcome.records.len(),
            complete: outcome.is_complete(),
        });
        outcome
    }

    /// Single request with the same rate-limit and retry handling as a page
    /// of [`Self::fetch_all`].
    pub async fn request<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<R> {
        let mut budget = RateLimitBudget::new(self.config.rate_limit_budget());
        self.call(request, &mut budget, observer).await
    }

    async fn search_page(
        &self,
        query: &SearchQuery,
        pagination: &Pagination,
        budget: &mut RateLimitBudget,
        observer: &dyn ProgressObserver,
    ) -> Result<SearchPage> {
        let body = SearchRequest { query: query.clone(), pagination: pagination.clone() };
        let body = serde_json::to_value(&body).map_err(Error::Encode)?;
        self.call(&HttpRequest::post(SEARCH_PATH, body), budget, observer)
            .await
    }

    async fn call<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        budget: &mut RateLimitBudget,
        observer: &dyn ProgressObserver,
    ) -> Result<R> {
        // Consecutive 429s for this request.
        let mut attempt = 0u32;

        loop {
            self.gate.wait_turn().await;

            match self.send_with_retry::<R>(request, observer).await? {
                Reply::Success(value) => return Ok(value),
                Reply::RateLimited(reset) => {
                    let units = rate_limit_wait(reset.as_deref(), Utc::now().timestamp(), attempt);
                    let units = u32::try_from(units).unwrap_or(u32::MAX);
                    let wait = self.config.time_unit().saturating_mul(units);
                    budget.spend(wait)?;

                    warn!(
                        path = %request.path,
                        attempt,
                        reset = ?reset,
                        wait_secs = wait.as_secs_f64(),
                        "Rate limited, waiting for reset"
                    );
                    observer.on_event(&FetchEvent::RateLimited { attempt, wait });

                    self.gate.block_for(wait).await;
                    attempt = attempt.saturating_add(1);
                }
                Reply::Rejected { status, body } => return Err(Error::Remote { status, body }),
            }
        }
    }

    async fn send_with_retry<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<Reply<R>> {
        (|| self.send_once::<R>(request))
            .retry(transport_backoff(&self.config))
            .sleep(tokio::time::sleep)
            .when(Error::is_transient)
            .notify(|error, wait| {
                warn!(error = %error, wait_ms = wait.as_millis(), "Transport failure, retrying");
                observer.on_event(&FetchEvent::TransportRetry { wait, error: error.to_string() });
            })
            .await
    }

    async fn send_once<R: DeserializeOwned>(&self, request: &HttpRequest) -> Result<Reply<R>> {
        let reply = self.transport.send(request).await?;
        match reply.status {
            200 => serde_json::from_str(&reply.body)
                .map(Reply::Success)
                .map_err(Error::Decode),
            429 => Ok(Reply::RateLimited(reply.rate_limit_reset)),
            status => Ok(Reply::Rejected { status, body: reply.body }),
        }
    }
}
