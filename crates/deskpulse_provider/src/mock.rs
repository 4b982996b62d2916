use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{json, Value};
use tokio::time::Instant;

use crate::{Error, HttpReply, HttpRequest, Result, Transport};

/// Transport that plays back a fixed list of replies and records every
/// request it was asked to send.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpReply>>>,
    requests: Mutex<Vec<HttpRequest>>,
    sent_at: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Result<HttpReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Default::default(),
            sent_at: Default::default(),
        }
    }

    /// When each request was sent, on the tokio clock.
    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent_at.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `starting_after` of every recorded search request, in order.
    pub fn cursors(&self) -> Vec<Option<String>> {
        self.requests()
            .iter()
            .map(|request| {
                request
                    .body
                    .as_ref()
                    .and_then(|body| body.pointer("/pagination/starting_after"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpReply> {
        self.requests.lock().unwrap().push(request.clone());
        self.sent_at.lock().unwrap().push(Instant::now());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Transport("script exhausted".to_string())))
    }
}

/// A 200 search page holding conversations with the given ids.
pub fn page(ids: &[&str], next: Option<&str>) -> Result<HttpReply> {
    let conversations: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "created_at": 1_700_000_000}))
        .collect();
    let pages = match next {
        Some(cursor) => json!({"next": {"starting_after": cursor}}),
        None => json!({"next": null}),
    };
    Ok(HttpReply::new(
        200,
        json!({"conversations": conversations, "pages": pages}).to_string(),
    ))
}

pub fn rate_limited(reset: Option<String>) -> Result<HttpReply> {
    let reply = HttpReply::new(429, r#"{"type":"error.list"}"#);
    Ok(match reset {
        Some(reset) => reply.rate_limit_reset(reset),
        None => reply,
    })
}

pub fn status(code: u16) -> Result<HttpReply> {
    Ok(HttpReply::new(code, r#"{"type":"error.list","errors":[{"code":"server_error"}]}"#))
}

pub fn transport_failure() -> Result<HttpReply> {
    Err(Error::Transport("connection reset by peer".to_string()))
}
