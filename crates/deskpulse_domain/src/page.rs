use serde::{Deserialize, Serialize};

use crate::Conversation;

/// Opaque pagination token. Only the server knows what it encodes.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From,
)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NextPage {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub starting_after: Option<PageCursor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pages {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
    #[serde(default)]
    pub next: Option<NextPage>,
}

/// One page of `POST /conversations/search`. Every field is optional on the
/// wire; a missing `pages` block means there is nothing after this page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub pages: Option<Pages>,
}

impl SearchPage {
    /// Cursor for the following page. An empty cursor counts as none.
    pub fn next_cursor(&self) -> Option<&PageCursor> {
        self.pages
            .as_ref()?
            .next
            .as_ref()?
            .starting_after
            .as_ref()
            .filter(|cursor| !cursor.as_str().is_empty())
    }
}
