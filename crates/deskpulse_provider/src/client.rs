use std::sync::Arc;

use deskpulse_domain::{
    Admin, AdminDirectory, AttributeDefinition, AttributeLabels, Conversation, ConversationId,
    Environment, FetchConfig, ProgressObserver, SearchQuery, Silent, Team,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    FetchOutcome, HttpRequest, HttpTransport, RateGate, RateLimitedFetcher, Result, Transport,
};

#[derive(Deserialize)]
struct DataAttributes {
    #[serde(default)]
    data: Vec<AttributeDefinition>,
}

#[derive(Deserialize)]
struct Admins {
    #[serde(default)]
    admins: Vec<Admin>,
}

#[derive(Deserialize)]
struct Teams {
    #[serde(default)]
    teams: Vec<Team>,
}

/// Helpdesk API client. Every call goes through one [`RateLimitedFetcher`],
/// so a 429 on any endpoint holds back the others too.
pub struct HelpdeskClient<T = HttpTransport> {
    fetcher: Arc<RateLimitedFetcher<T>>,
}

impl<T> Clone for HelpdeskClient<T> {
    fn clone(&self) -> Self {
        Self { fetcher: self.fetcher.clone() }
    }
}

impl HelpdeskClient<HttpTransport> {
    pub fn new(env: &Environment, config: FetchConfig) -> Result<Self> {
        let transport = HttpTransport::new(env.api_url.clone(), &env.token)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> HelpdeskClient<T> {
    pub fn with_transport(transport: T, config: FetchConfig) -> Self {
        let fetcher = RateLimitedFetcher::new(Arc::new(transport), config, RateGate::new());
        Self { fetcher: Arc::new(fetcher) }
    }

    pub fn config(&self) -> &FetchConfig {
        self.fetcher.config()
    }

    pub async fn search_conversations(
        &self,
        query: &SearchQuery,
        observer: &dyn ProgressObserver,
    ) -> FetchOutcome {
        self.fetcher.fetch_all(query, observer).await
    }

    pub async fn search_conversations_matching<F>(
        &self,
        query: &SearchQuery,
        keep: F,
        observer: &dyn ProgressObserver,
    ) -> FetchOutcome
    where
        F: Fn(&Conversation) -> bool,
    {
        self.fetcher.fetch_matching(query, keep, observer).await
    }

    /// Display labels of the conversation data attributes.
    pub async fn attribute_labels(&self) -> Result<AttributeLabels> {
        let request = HttpRequest::get("data_attributes").query("model", "conversation");
        let response: DataAttributes = self.fetcher.request(&request, &Silent).await?;
        debug!(count = response.data.len(), "Loaded data attributes");
        Ok(response.data.into_iter().collect())
    }

    pub async fn admins(&self) -> Result<AdminDirectory> {
        let response: Admins = self.fetcher.request(&HttpRequest::get("admins"), &Silent).await?;
        debug!(count = response.admins.len(), "Loaded admins");
        Ok(response.admins.into_iter().collect())
    }

    pub async fn teams(&self) -> Result<Vec<Team>> {
        let response: Teams = self.fetcher.request(&HttpRequest::get("teams"), &Silent).await?;
        Ok(response.teams)
    }

    pub async fn conversation(&self, id: &ConversationId) -> Result<Conversation> {
        let request = HttpRequest::get(format!("conversations/{id}"));
        self.fetcher.request(&request, &Silent).await
    }
}
