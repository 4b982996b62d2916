use derive_setters::Setters;
use deskpulse_domain::Conversation;
use serde_json::Value;

pub const COLUMN_ID: &str = "ID";
pub const COLUMN_DATE: &str = "Date";
pub const COLUMN_ASSIGNEE: &str = "Assignee";
pub const COLUMN_REPLY_TIME: &str = "Reply time";
pub const COLUMN_RESOLUTION_TIME: &str = "Resolution time";
pub const COLUMN_RATING: &str = "CSAT rating";
pub const COLUMN_REMARK: &str = "CSAT remark";
pub const COLUMN_LINK: &str = "Link";

/// Columns every row has regardless of the attribute schema.
pub const FIXED_COLUMNS: [&str; 8] = [
    COLUMN_ID,
    COLUMN_DATE,
    COLUMN_ASSIGNEE,
    COLUMN_REPLY_TIME,
    COLUMN_RESOLUTION_TIME,
    COLUMN_RATING,
    COLUMN_REMARK,
    COLUMN_LINK,
];

pub fn is_fixed_column(column: &str) -> bool {
    FIXED_COLUMNS.contains(&column)
}

/// Attribute labels the report metrics read. Defaults match the workspace's
/// conversation schema.
#[derive(Debug, Clone, PartialEq, Setters)]
#[setters(into)]
pub struct ReportColumns {
    pub reason: String,
    pub second_reason: String,
    pub status: String,
    /// Value of the status column that counts as resolved.
    pub resolved_value: String,
    pub service_type: String,
    /// Raw attribute name, not label, used to spot back-office tickets.
    pub category_attribute: String,
    pub back_office_value: String,
    /// Attributes picked for analysis when the caller does not choose any.
    pub suggested: Vec<String>,
}

impl Default for ReportColumns {
    fn default() -> Self {
        Self {
            reason: "Motivo de Contato".to_string(),
            second_reason: "Motivo 2 (Se houver)".to_string(),
            status: "Status do atendimento".to_string(),
            resolved_value: "Resolvido".to_string(),
            service_type: "Tipo de Atendimento".to_string(),
            category_attribute: "Ticket category".to_string(),
            back_office_value: "Back-office ticket".to_string(),
            suggested: vec![
                "Tipo de Atendimento".to_string(),
                "Expansão (Passagem de bastão para CSM)".to_string(),
                "Motivo de Contato".to_string(),
                "Motivo 2 (Se houver)".to_string(),
                "Status do atendimento".to_string(),
            ],
        }
    }
}

impl ReportColumns {
    pub fn is_back_office(&self, conversation: &Conversation) -> bool {
        conversation
            .custom_attribute(&self.category_attribute)
            .and_then(Value::as_str)
            == Some(self.back_office_value.as_str())
    }
}
