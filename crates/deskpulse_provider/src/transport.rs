use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::utils::format_http_context;
use crate::{Error, Result};

pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// A request against the helpdesk API, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into(), query: Vec::new(), body: None }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self { method: Method::Post, path: path.into(), query: Vec::new(), body: Some(body) }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// What came back: the status, the rate-limit reset header if any, and the
/// raw body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub rate_limit_reset: Option<String>,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, rate_limit_reset: None, body: body.into() }
    }

    pub fn rate_limit_reset(mut self, reset: impl Into<String>) -> Self {
        self.rate_limit_reset = Some(reset.into());
        self
    }
}

/// One round trip to the API. Implementations report transport-level
/// failures as errors and every HTTP status as a reply.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: &HttpRequest) -> Result<HttpReply>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl HttpTransport {
    pub fn new(base_url: Url, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(5)
            .redirect(Policy::limited(10))
            .build()
            .map_err(Error::Client)?;

        Ok(Self { client, base_url, headers: Self::headers(token)? })
    }

    fn headers(token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn url(&self, path: &str) -> Result<Url> {
        // Validate the path doesn't contain certain patterns
        if path.contains("://") || path.contains("..") {
            return Err(Error::InvalidPath(path.to_string()));
        }

        // Remove leading slash to avoid double slashes
        let path = path.trim_start_matches('/');
        self.base_url.join(path).map_err(Error::Url)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpReply> {
        let url = self.url(&request.path)?;
        let method = request.method.to_string();

        debug!(url = %url, method = %method, "Sending request");

        let builder = match request.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
        };
        let mut builder = builder.headers(self.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            Error::Transport(format!("{}: {e}", format_http_context(e.status(), &method, &url)))
        })?;

        let status = response.status();
        let rate_limit_reset = response
            .headers()
            .get(RATE_LIMIT_RESET_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| {
            Error::Transport(format!(
                "{}: failed to read body: {e}",
                format_http_context(Some(status), &method, &url)
            ))
        })?;

        debug!(status = %status.as_u16(), url = %url, "Received response");

        Ok(HttpReply { status: status.as_u16(), rate_limit_reset, body })
    }
}
