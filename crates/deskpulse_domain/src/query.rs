use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PageCursor;

/// Comparison operators understood by the conversation search endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Operator {
    #[serde(rename = "=")]
    #[strum(serialize = "=")]
    Eq,
    #[serde(rename = "!=")]
    #[strum(serialize = "!=")]
    NotEq,
    #[serde(rename = ">")]
    #[strum(serialize = ">")]
    Gt,
    #[serde(rename = "<")]
    #[strum(serialize = "<")]
    Lt,
    #[serde(rename = "IN")]
    #[strum(serialize = "IN")]
    In,
    #[serde(rename = "NIN")]
    #[strum(serialize = "NIN")]
    NotIn,
    #[serde(rename = "~")]
    #[strum(serialize = "~")]
    Contains,
    #[serde(rename = "!~")]
    #[strum(serialize = "!~")]
    NotContains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRule {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl QueryRule {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self { field: field.into(), operator, value: value.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[default]
    #[serde(rename = "AND")]
    And,
}

/// Field/operator/value rules combined with a logical AND. Serializes to the
/// `query` block of the search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    operator: LogicalOperator,
    #[serde(rename = "value")]
    rules: Vec<QueryRule>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversations created strictly inside `(start, end)`, both in epoch
    /// seconds.
    pub fn created_between(start: i64, end: i64) -> Self {
        Self::new()
            .rule(QueryRule::new("created_at", Operator::Gt, start))
            .rule(QueryRule::new("created_at", Operator::Lt, end))
    }

    pub fn rule(mut self, rule: QueryRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field(self, field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.rule(QueryRule::new(field, operator, value))
    }

    /// Adds a `team_assignee_id IN [...]` rule. An empty slice leaves the query
    /// unchanged.
    pub fn in_teams(self, team_ids: &[u64]) -> Self {
        if team_ids.is_empty() {
            return self;
        }
        self.field("team_assignee_id", Operator::In, team_ids.to_vec())
    }

    pub fn rules(&self) -> &[QueryRule] {
        &self.rules
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(into)]
pub struct Pagination {
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_after: Option<PageCursor>,
}

impl Pagination {
    pub fn new(per_page: u32) -> Self {
        Self { per_page, starting_after: None }
    }
}

/// Full body of a `POST /conversations/search` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: SearchQuery,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_search_request_wire_format() {
        let fixture = SearchRequest {
            query: SearchQuery::created_between(100, 200)
                .field("state", Operator::Eq, "closed")
                .in_teams(&[2975006, 1972225]),
            pagination: Pagination::new(150).starting_after(Some(PageCursor::new("abc"))),
        };

        let actual = serde_json::to_value(&fixture).unwrap();
        let expected = json!({
            "query": {
                "operator": "AND",
                "value": [
                    {"field": "created_at", "operator": ">", "value": 100},
                    {"field": "created_at", "operator": "<", "value": 200},
                    {"field": "state", "operator": "=", "value": "closed"},
                    {"field": "team_assignee_id", "operator": "IN", "value": [2975006, 1972225]}
                ]
            },
            "pagination": {"per_page": 150, "starting_after": "abc"}
        });
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_first_page_omits_cursor() {
        let actual = serde_json::to_value(Pagination::new(50)).unwrap();
        assert_eq!(actual, json!({"per_page": 50}));
    }

    #[test]
    fn test_in_teams_ignores_empty_list() {
        let actual = SearchQuery::new().in_teams(&[]);
        assert_eq!(actual.rules().len(), 0);
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(Operator::NotIn.to_string(), "NIN");
        assert_eq!(Operator::Gt.to_string(), ">");
    }
}
