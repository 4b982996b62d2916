use std::fmt::Display;

use chrono::{TimeZone, Utc};
use deskpulse_domain::{
    conversation_link, AdminDirectory, AttributeLabels, Conversation, ConversationId,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    format_duration, is_fixed_column, COLUMN_ASSIGNEE, COLUMN_DATE, COLUMN_ID, COLUMN_LINK,
    COLUMN_RATING, COLUMN_REMARK, COLUMN_REPLY_TIME, COLUMN_RESOLUTION_TIME,
};

/// One conversation projected onto report columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationRow {
    pub id: ConversationId,
    pub created_at: i64,
    pub date: String,
    pub assignee: String,
    pub link: String,
    pub reply_seconds: Option<i64>,
    pub resolution_seconds: Option<i64>,
    pub rating: Option<i64>,
    pub remark: Option<String>,
    /// Custom attributes keyed by display label, in the order the API sent
    /// them.
    pub attributes: IndexMap<String, Value>,
}

impl ConversationRow {
    pub fn attribute(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column).filter(|value| !value.is_null())
    }

    /// Attribute as text. Non-string scalars use their JSON form.
    pub fn text(&self, column: &str) -> Option<String> {
        self.attribute(column).and_then(display_value)
    }

    pub fn reply_time(&self) -> String {
        format_duration(self.reply_seconds.map(|s| s as f64))
    }

    pub fn resolution_time(&self) -> String {
        format_duration(self.resolution_seconds.map(|s| s as f64))
    }

    pub fn has_column(&self, column: &str) -> bool {
        is_fixed_column(column) || self.attributes.contains_key(column)
    }

    /// Value of a fixed or attribute column, `Null` when absent.
    pub fn cell(&self, column: &str) -> Value {
        match column {
            COLUMN_ID => Value::from(self.id.as_str()),
            COLUMN_DATE => Value::from(self.date.as_str()),
            COLUMN_ASSIGNEE => Value::from(self.assignee.as_str()),
            COLUMN_REPLY_TIME => Value::from(self.reply_time()),
            COLUMN_RESOLUTION_TIME => Value::from(self.resolution_time()),
            COLUMN_RATING => self.rating.map_or(Value::Null, Value::from),
            COLUMN_REMARK => self.remark.as_deref().map_or(Value::Null, Value::from),
            COLUMN_LINK => Value::from(self.link.as_str()),
            _ => self.attributes.get(column).cloned().unwrap_or(Value::Null),
        }
    }
}

pub(crate) fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Turns raw conversations into report rows.
#[derive(Debug, Clone)]
pub struct Flattener<Tz: TimeZone = Utc> {
    pub workspace: String,
    /// Zone used to render the `Date` column. Each timestamp gets the offset
    /// in force at that instant.
    pub timezone: Tz,
    /// Attribute columns present on every row, as `Null` when the
    /// conversation lacks them.
    pub always_columns: Vec<String>,
    pub date_format: String,
}

impl Flattener {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            timezone: Utc,
            always_columns: vec!["Motivo 2 (Se houver)".to_string()],
            date_format: "%d/%m/%Y %H:%M".to_string(),
        }
    }
}

impl<Tz: TimeZone> Flattener<Tz>
where
    Tz::Offset: Display,
{
    pub fn in_timezone<Z: TimeZone>(self, timezone: Z) -> Flattener<Z> {
        Flattener {
            workspace: self.workspace,
            timezone,
            always_columns: self.always_columns,
            date_format: self.date_format,
        }
    }

    /// Rows sorted by creation time. Conversations without an id or a
    /// creation time are skipped.
    pub fn flatten(
        &self,
        conversations: &[Conversation],
        labels: &AttributeLabels,
        admins: &AdminDirectory,
    ) -> Vec<ConversationRow> {
        let mut rows: Vec<ConversationRow> = conversations
            .iter()
            .filter_map(|conversation| self.row(conversation, labels, admins))
            .collect();

        if !rows.is_empty() {
            for row in &mut rows {
                for column in &self.always_columns {
                    row.attributes.entry(column.clone()).or_insert(Value::Null);
                }
            }
        }

        rows.sort_by_key(|row| row.created_at);
        rows
    }

    pub fn row(
        &self,
        conversation: &Conversation,
        labels: &AttributeLabels,
        admins: &AdminDirectory,
    ) -> Option<ConversationRow> {
        let (Some(id), Some(created_at)) = (conversation.id(), conversation.created_at()) else {
            warn!(fields = ?conversation.as_map().keys().collect::<Vec<_>>(), "Skipping conversation without id or created_at");
            return None;
        };

        let assignee = match conversation.admin_assignee_id() {
            Some(admin) => admins
                .name_of(&admin)
                .map(str::to_string)
                .unwrap_or_else(|| format!("ID {admin}")),
            None => "Unassigned".to_string(),
        };

        let stats = conversation.statistics();
        let reply_seconds = stats
            .time_to_admin_reply
            .filter(|seconds| *seconds != 0)
            .or(stats.response_time);
        let resolution_seconds = match stats.time_to_close {
            Some(seconds) if seconds != 0 => Some(seconds),
            other => stats
                .last_close_at
                .filter(|closed| *closed != 0)
                .map(|closed| closed - created_at)
                .or(other),
        };

        let rating = conversation.rating();
        let attributes = conversation
            .custom_attributes()
            .map(|(name, value)| (labels.label_for(name).to_string(), value.clone()))
            .collect();

        Some(ConversationRow {
            link: conversation_link(&self.workspace, &id),
            id,
            created_at,
            date: self.format_date(created_at),
            assignee,
            reply_seconds,
            resolution_seconds,
            rating: rating.rating,
            remark: rating.remark,
            attributes,
        })
    }

    fn format_date(&self, timestamp: i64) -> String {
        self.timezone
            .timestamp_opt(timestamp, 0)
            .single()
            .map(|at| at.format(&self.date_format).to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use chrono_tz::America::New_York;
    use deskpulse_domain::Admin;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn conversations() -> Vec<Conversation> {
        serde_json::from_value(json!([
            {
                "id": "200",
                "created_at": 1_700_003_600,
                "admin_assignee_id": 99,
                "statistics": {"time_to_admin_reply": 0, "response_time": 120, "last_close_at": 1_700_007_200},
                "custom_attributes": {"reason": "Financeiro > Boleto"}
            },
            {
                "id": "100",
                "created_at": 1_700_000_000,
                "admin_assignee_id": "7",
                "statistics": {"time_to_admin_reply": 45, "time_to_close": 3600},
                "conversation_rating": {"rating": 5, "remark": "Ótimo"},
                "custom_attributes": {"reason": "Acesso > Senha", "Motivo 2 (Se houver)": "Cadastro"}
            },
            {
                "id": "300",
                "created_at": 1_700_010_000,
                "admin_assignee_id": null,
                "custom_attributes": {"unlabelled": true}
            },
            {"created_at": 1_700_000_500}
        ]))
        .unwrap()
    }

    fn setup() -> (Flattener<FixedOffset>, AttributeLabels, AdminDirectory) {
        let flattener = Flattener::new("ws1").in_timezone(FixedOffset::west_opt(3 * 3600).unwrap());
        let labels = AttributeLabels::new().insert("reason", "Motivo de Contato");
        let admins = [Admin { id: "7".to_string(), name: Some("Ana".to_string()), team_ids: vec![] }]
            .into_iter()
            .collect();
        (flattener, labels, admins)
    }

    #[test]
    fn test_rows_sorted_and_invalid_skipped() {
        let (fixture, labels, admins) = setup();

        let actual: Vec<String> = fixture
            .flatten(&conversations(), &labels, &admins)
            .iter()
            .map(|row| row.id.to_string())
            .collect();

        assert_eq!(actual, vec!["100", "200", "300"]);
    }

    #[test]
    fn test_row_projection() {
        let (fixture, labels, admins) = setup();

        let actual = fixture.flatten(&conversations(), &labels, &admins).remove(0);

        let expected = ConversationRow {
            id: ConversationId::new("100"),
            created_at: 1_700_000_000,
            date: "14/11/2023 19:13".to_string(),
            assignee: "Ana".to_string(),
            link: "https://app.intercom.com/a/inbox/ws1/inbox/conversation/100".to_string(),
            reply_seconds: Some(45),
            resolution_seconds: Some(3600),
            rating: Some(5),
            remark: Some("Ótimo".to_string()),
            attributes: IndexMap::from([
                ("Motivo de Contato".to_string(), json!("Acesso > Senha")),
                ("Motivo 2 (Se houver)".to_string(), json!("Cadastro")),
            ]),
        };
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_fallbacks() {
        let (fixture, labels, admins) = setup();
        let rows = fixture.flatten(&conversations(), &labels, &admins);

        let actual = &rows[1];
        assert_eq!(actual.assignee, "ID 99");
        assert_eq!(actual.reply_seconds, Some(120));
        assert_eq!(actual.resolution_seconds, Some(3600));
        assert_eq!(actual.reply_time(), "2m 0s");
        assert_eq!(actual.resolution_time(), "1h");

        let actual = &rows[2];
        assert_eq!(actual.assignee, "Unassigned");
        assert_eq!(actual.resolution_seconds, None);
        assert_eq!(actual.resolution_time(), "-");
        assert_eq!(actual.attribute("unlabelled"), Some(&json!(true)));
        assert_eq!(actual.text("unlabelled"), Some("true".to_string()));
    }

    #[test]
    fn test_always_columns_are_null_when_missing() {
        let (fixture, labels, admins) = setup();
        let rows = fixture.flatten(&conversations(), &labels, &admins);

        assert_eq!(rows[2].attributes.get("Motivo 2 (Se houver)"), Some(&Value::Null));
        assert_eq!(rows[2].attribute("Motivo 2 (Se houver)"), None);
        assert_eq!(rows[2].cell("Motivo 2 (Se houver)"), Value::Null);
    }

    #[test]
    fn test_empty_input_has_no_rows() {
        let (fixture, labels, admins) = setup();
        assert!(fixture.flatten(&[], &labels, &admins).is_empty());
    }

    #[test]
    fn test_date_follows_daylight_saving() {
        let fixture = Flattener::new("ws").in_timezone(New_York);
        let conversations: Vec<Conversation> = serde_json::from_value(json!([
            {"id": "winter", "created_at": 1_705_320_000},
            {"id": "summer", "created_at": 1_720_000_000}
        ]))
        .unwrap();

        let actual: Vec<String> = fixture
            .flatten(&conversations, &AttributeLabels::new(), &AdminDirectory::default())
            .into_iter()
            .map(|row| row.date)
            .collect();

        assert_eq!(actual, vec!["15/01/2024 07:00", "03/07/2024 05:46"]);
    }

    #[test]
    fn test_cells() {
        let (fixture, labels, admins) = setup();
        let rows = fixture.flatten(&conversations(), &labels, &admins);

        assert_eq!(rows[0].cell(COLUMN_RATING), json!(5));
        assert_eq!(rows[1].cell(COLUMN_RATING), Value::Null);
        assert_eq!(rows[0].cell(COLUMN_REPLY_TIME), json!("45s"));
        assert_eq!(rows[0].cell("Motivo de Contato"), json!("Acesso > Senha"));
        assert!(rows[0].has_column(COLUMN_LINK));
        assert!(!rows[0].has_column("Nope"));
    }
}
