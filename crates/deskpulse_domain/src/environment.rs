use std::path::PathBuf;

use derive_setters::Setters;
use url::Url;

use crate::ConversationId;

pub const DEFAULT_API_URL: &str = "https://api.intercom.io/";
pub const DEFAULT_WORKSPACE: &str = "xwvpdtlu";

#[derive(Debug, Setters, Clone)]
#[setters(strip_option, into)]
/// Represents the environment in which the application is running.
pub struct Environment {
    /// Bearer token for the helpdesk API.
    pub token: String,
    /// Base URL of the helpdesk API, always ending with a slash.
    pub api_url: Url,
    /// Workspace id used to build inbox links.
    pub workspace_id: String,
    /// Optional Slack incoming webhook for alerts.
    pub slack_webhook: Option<Url>,
    /// The base path relative to which everything else is stored.
    pub base_path: PathBuf,
}

impl Environment {
    pub fn log_path(&self) -> PathBuf {
        self.base_path.join("logs")
    }

    pub fn conversation_link(&self, id: &ConversationId) -> String {
        conversation_link(&self.workspace_id, id)
    }
}

pub fn conversation_link(workspace_id: &str, id: &ConversationId) -> String {
    format!("https://app.intercom.com/a/inbox/{workspace_id}/inbox/conversation/{id}")
}
