use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Remote-assigned conversation id. Intercom sends these as strings, but some
/// endpoints echo them back as numbers, so both are accepted.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Accepts either a bare id or an inbox URL and keeps the last path
    /// segment.
    pub fn parse_reference(input: &str) -> Result<Self> {
        let segment = input
            .trim()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .trim();

        if segment.is_empty() {
            return Err(Error::InvalidConversationReference(input.to_string()));
        }

        Ok(Self(segment.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Renders a JSON scalar as a lookup key. Ids travel as both strings and
/// numbers depending on the endpoint.
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|seconds| seconds as i64))
}

/// A conversation exactly as the API returned it. It is only ever read and
/// re-projected, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation(Map<String, Value>);

impl Conversation {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Field lookup that treats JSON `null` as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    pub fn id(&self) -> Option<ConversationId> {
        self.get("id").and_then(scalar_key).map(ConversationId)
    }

    pub fn created_at(&self) -> Option<i64> {
        self.get("created_at").and_then(as_seconds)
    }

    pub fn state(&self) -> Option<&str> {
        self.get("state").and_then(Value::as_str)
    }

    pub fn admin_assignee_id(&self) -> Option<String> {
        self.get("admin_assignee_id").and_then(scalar_key)
    }

    pub fn team_assignee_id(&self) -> Option<String> {
        self.get("team_assignee_id").and_then(scalar_key)
    }

    pub fn statistics(&self) -> Statistics {
        let stats = self.get("statistics").and_then(Value::as_object);
        let read = |name: &str| {
            stats
                .and_then(|stats| stats.get(name))
                .and_then(as_seconds)
        };

        Statistics {
            time_to_admin_reply: read("time_to_admin_reply"),
            response_time: read("response_time"),
            time_to_close: read("time_to_close"),
            last_close_at: read("last_close_at"),
        }
    }

    pub fn rating(&self) -> Rating {
        let rating = self.get("conversation_rating").and_then(Value::as_object);
        Rating {
            rating: rating
                .and_then(|r| r.get("rating"))
                .and_then(Value::as_i64),
            remark: rating
                .and_then(|r| r.get("remark"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Custom attributes in the order the API sent them.
    pub fn custom_attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.get("custom_attributes")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|attributes| attributes.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn custom_attribute(&self, name: &str) -> Option<&Value> {
        self.custom_attributes()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .filter(|value| !value.is_null())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Conversation {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Timing figures from the nested `statistics` block, in epoch seconds or
/// elapsed seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub time_to_admin_reply: Option<i64>,
    pub response_time: Option<i64>,
    pub time_to_close: Option<i64>,
    pub last_close_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rating {
    pub rating: Option<i64>,
    pub remark: Option<String>,
}
