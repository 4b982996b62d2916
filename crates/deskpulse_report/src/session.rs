use std::fmt::Display;

use chrono::TimeZone;
use derive_setters::Setters;
use deskpulse_domain::{AdminDirectory, AttributeLabels, Conversation};
use indexmap::IndexSet;
use tracing::warn;

use crate::{export, summary, ConversationRow, ExportBundle, Flattener, Kpis, ReportColumns};

/// Rows from one fetch, and whether that fetch reached the last page.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<ConversationRow>,
    pub complete: bool,
}

impl Report {
    pub fn new(rows: Vec<ConversationRow>, complete: bool) -> Self {
        Self { rows, complete }
    }

    /// Attribute columns seen on any row, in first-seen order.
    pub fn attribute_columns(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(|row| row.attributes.keys().cloned())
            .collect::<IndexSet<String>>()
            .into_iter()
            .collect()
    }

    /// Columns to analyse: `requested` when given, otherwise the suggested
    /// ones. Columns no row has are dropped.
    pub fn selection(&self, columns: &ReportColumns, requested: &[String]) -> Vec<String> {
        let available = self.attribute_columns();
        let wanted = if requested.is_empty() { columns.suggested.as_slice() } else { requested };

        wanted
            .iter()
            .filter(|column| {
                let known = available.contains(column);
                if !known && !requested.is_empty() {
                    warn!(column = %column, "Requested attribute is not present in the report");
                }
                known
            })
            .cloned()
            .collect()
    }

    pub fn kpis(&self, columns: &ReportColumns) -> Kpis {
        summary(&self.rows, columns)
    }

    pub fn export(&self, selected: &[String]) -> ExportBundle {
        export(&self.rows, selected)
    }
}

/// State kept for the length of a run: lookup tables loaded once and the
/// last report built from them.
#[derive(Debug, Clone, Default, Setters)]
#[setters(into)]
pub struct Session {
    pub labels: AttributeLabels,
    pub admins: AdminDirectory,
    #[setters(skip)]
    report: Option<Report>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current report with one built from `conversations`.
    pub fn load<Tz>(
        &mut self,
        flattener: &Flattener<Tz>,
        conversations: &[Conversation],
        complete: bool,
    ) -> &Report
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let rows = flattener.flatten(conversations, &self.labels, &self.admins);
        self.report.insert(Report::new(rows, complete))
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }
}
