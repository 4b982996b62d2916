use serde::Serialize;
use serde_json::Value;

use crate::row::display_value;
use crate::{
    metrics::value_counts, ConversationRow, COLUMN_ASSIGNEE, COLUMN_DATE, COLUMN_ID, COLUMN_LINK,
    COLUMN_RATING, COLUMN_REMARK, COLUMN_REPLY_TIME, COLUMN_RESOLUTION_TIME,
};

pub const FULL_SHEET: &str = "Full data";
const SHEET_NAME_LIMIT: usize = 30;

/// Columns that never get a value-count sheet.
const UNSUMMARISED: [&str; 3] = [COLUMN_DATE, COLUMN_LINK, COLUMN_ID];

/// Columns that open the full sheet, ahead of the selected ones.
const LEADING: [&str; 7] = [
    COLUMN_DATE,
    COLUMN_ASSIGNEE,
    COLUMN_REPLY_TIME,
    COLUMN_RESOLUTION_TIME,
    COLUMN_RATING,
    COLUMN_REMARK,
    COLUMN_LINK,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountSheet {
    pub name: String,
    pub column: String,
    pub counts: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// A workbook-shaped export: one value-count sheet per selected attribute
/// plus the full table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBundle {
    pub summaries: Vec<CountSheet>,
    pub full: Sheet,
}

/// First 30 characters of `column`, with `/` replaced.
pub fn sheet_name(column: &str) -> String {
    column
        .chars()
        .take(SHEET_NAME_LIMIT)
        .collect::<String>()
        .replace('/', "-")
}

fn present(rows: &[ConversationRow], column: &str) -> bool {
    rows.iter().any(|row| row.has_column(column))
}

pub fn export(rows: &[ConversationRow], selected: &[String]) -> ExportBundle {
    let summaries = selected
        .iter()
        .filter(|column| !UNSUMMARISED.contains(&column.as_str()) && present(rows, column))
        .map(|column| CountSheet {
            name: sheet_name(column),
            column: column.clone(),
            counts: value_counts(rows.iter().filter_map(|row| display_value(&row.cell(column))))
                .into_iter()
                .map(|(value, count)| ValueCount { value, count })
                .collect(),
        })
        .collect();

    let columns: Vec<String> = LEADING
        .iter()
        .map(|column| column.to_string())
        .chain(
            selected
                .iter()
                .filter(|column| !LEADING.contains(&column.as_str()))
                .cloned(),
        )
        .filter(|column| present(rows, column))
        .collect();

    let table = rows
        .iter()
        .map(|row| columns.iter().map(|column| row.cell(column)).collect())
        .collect();

    ExportBundle {
        summaries,
        full: Sheet { name: FULL_SHEET.to_string(), columns, rows: table },
    }
}

#[cfg(test)]
mod tests {
    use deskpulse_domain::ConversationId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn fixture() -> Vec<ConversationRow> {
        let row = |id: &str, reason: Value| ConversationRow {
            id: ConversationId::new(id),
            created_at: 0,
            date: "01/02/2024 10:00".to_string(),
            assignee: "Ana".to_string(),
            link: format!("https://example.com/{id}"),
            reply_seconds: Some(30),
            resolution_seconds: None,
            rating: None,
            remark: None,
            attributes: [("Motivo de Contato".to_string(), reason)].into_iter().collect(),
        };
        vec![row("1", json!("Acesso")), row("2", json!("Acesso")), row("3", Value::Null)]
    }

    #[test]
    fn test_sheet_name() {
        assert_eq!(sheet_name("Expansão (Passagem de bastão para CSM)"), "Expansão (Passagem de bastão p");
        assert_eq!(sheet_name("Sim/Não"), "Sim-Não");
    }

    #[test]
    fn test_summaries_skip_fixed_and_missing_columns() {
        let selected = vec!["Date".to_string(), "Motivo de Contato".to_string(), "Nope".to_string()];

        let actual = export(&fixture(), &selected).summaries;

        let expected = vec![CountSheet {
            name: "Motivo de Contato".to_string(),
            column: "Motivo de Contato".to_string(),
            counts: vec![ValueCount { value: "Acesso".to_string(), count: 2 }],
        }];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_full_sheet_layout() {
        let selected = vec!["Motivo de Contato".to_string(), "Link".to_string()];

        let actual = export(&fixture(), &selected).full;

        assert_eq!(actual.name, "Full data");
        assert_eq!(
            actual.columns,
            vec![
                "Date",
                "Assignee",
                "Reply time",
                "Resolution time",
                "CSAT rating",
                "CSAT remark",
                "Link",
                "Motivo de Contato"
            ]
        );
        assert_eq!(
            actual.rows[0],
            vec![
                json!("01/02/2024 10:00"),
                json!("Ana"),
                json!("30s"),
                json!("-"),
                Value::Null,
                Value::Null,
                json!("https://example.com/1"),
                json!("Acesso"),
            ]
        );
        assert_eq!(actual.rows.len(), 3);
    }

    #[test]
    fn test_empty_export() {
        let actual = export(&[], &["Motivo de Contato".to_string()]);
        assert!(actual.summaries.is_empty());
        assert!(actual.full.columns.is_empty());
    }
}
