use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{ConversationRow, ReportColumns};

/// Headline figures for a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total: usize,
    /// Rows with a reason set.
    pub classified: usize,
    pub resolved: usize,
    pub mean_resolution_seconds: Option<f64>,
    /// Most frequent reason, last `>` segment only.
    pub top_reason: Option<String>,
}

/// One value of a column with its count and share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossCell {
    pub group: String,
    pub value: String,
    pub count: usize,
    /// Share of `count` within its `group`.
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsatOrder {
    #[default]
    BestFirst,
    WorstFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupScore {
    pub group: String,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsatSummary {
    pub mean: f64,
    pub count: usize,
    pub by_group: Vec<GroupScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStats {
    pub agent: String,
    pub volume: usize,
    pub mean_resolution_seconds: f64,
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Counts in descending order. Ties keep first-seen order.
pub(crate) fn value_counts(values: impl IntoIterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn shares(counts: Vec<(String, usize)>, whole: usize) -> Vec<Share> {
    counts
        .into_iter()
        .map(|(value, count)| Share { percent: percent(count, whole), value, count })
        .collect()
}

pub fn summary(rows: &[ConversationRow], columns: &ReportColumns) -> Kpis {
    let classified = rows.iter().filter(|row| row.attribute(&columns.reason).is_some()).count();
    let resolved = rows
        .iter()
        .filter(|row| row.text(&columns.status).as_deref() == Some(columns.resolved_value.as_str()))
        .count();
    let mean_resolution_seconds =
        mean(rows.iter().filter_map(|row| row.resolution_seconds).map(|s| s as f64));
    let top_reason = value_counts(rows.iter().filter_map(|row| row.text(&columns.reason)))
        .into_iter()
        .next()
        .map(|(reason, _)| {
            reason
                .rsplit('>')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        });

    Kpis { total: rows.len(), classified, resolved, mean_resolution_seconds, top_reason }
}

/// Non-null values of `column`, most frequent first, with their share of the
/// non-null total.
pub fn distribution(rows: &[ConversationRow], column: &str) -> Vec<Share> {
    let values: Vec<String> = rows.iter().filter_map(|row| row.text(column)).collect();
    let whole = values.len();
    shares(value_counts(values), whole)
}

/// Rows per assignee.
pub fn agent_volume(rows: &[ConversationRow]) -> Vec<Share> {
    shares(value_counts(rows.iter().map(|row| row.assignee.clone())), rows.len())
}

/// Counts of `(group, value)` pairs over rows where both are set, ordered by
/// group then value.
pub fn cross_tab(rows: &[ConversationRow], group: &str, value: &str) -> Vec<CrossCell> {
    let mut pairs: IndexMap<(String, String), usize> = IndexMap::new();
    let mut totals: IndexMap<String, usize> = IndexMap::new();

    for row in rows {
        if let (Some(a), Some(b)) = (row.text(group), row.text(value)) {
            *totals.entry(a.clone()).or_default() += 1;
            *pairs.entry((a, b)).or_default() += 1;
        }
    }

    pairs.sort_keys();
    pairs
        .into_iter()
        .map(|((group, value), count)| {
            let whole = totals.get(&group).copied().unwrap_or_default();
            CrossCell { percent: percent(count, whole), group, value, count }
        })
        .collect()
}

/// Combined ranking of two reason columns, cut to `limit`. Percentages are of
/// every counted reason, not only the ones shown.
pub fn top_reasons(rows: &[ConversationRow], first: &str, second: &str, limit: usize) -> Vec<Share> {
    let values: Vec<String> = rows
        .iter()
        .filter_map(|row| row.text(first))
        .chain(rows.iter().filter_map(|row| row.text(second)))
        .collect();
    let whole = values.len();

    let mut ranking = shares(value_counts(values), whole);
    ranking.truncate(limit);
    ranking
}

/// Satisfaction scores over rated rows. `None` when nothing was rated.
pub fn csat(rows: &[ConversationRow], group_by: &str, order: CsatOrder) -> Option<CsatSummary> {
    let rated: Vec<(&ConversationRow, f64)> = rows
        .iter()
        .filter_map(|row| row.rating.map(|rating| (row, rating as f64)))
        .collect();
    let overall = mean(rated.iter().map(|(_, rating)| *rating))?;

    let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
    for (row, rating) in &rated {
        if let Some(group) = row.text(group_by) {
            groups.entry(group).or_default().push(*rating);
        }
    }

    let mut by_group: Vec<GroupScore> = groups
        .into_iter()
        .filter_map(|(group, ratings)| {
            let count = ratings.len();
            mean(ratings).map(|mean| GroupScore { group, mean, count })
        })
        .collect();
    by_group.sort_by(|a, b| {
        let ordering = a.mean.partial_cmp(&b.mean).unwrap_or(Ordering::Equal);
        match order {
            CsatOrder::BestFirst => ordering.reverse(),
            CsatOrder::WorstFirst => ordering,
        }
    });

    Some(CsatSummary { mean: overall, count: rated.len(), by_group })
}

/// Volume and mean resolution time per assignee, fastest first. Agents
/// without a positive mean are left out.
pub fn agent_performance(rows: &[ConversationRow]) -> Vec<AgentStats> {
    let mut agents: IndexMap<&str, (usize, Vec<f64>)> = IndexMap::new();
    for row in rows {
        let (volume, times) = agents.entry(row.assignee.as_str()).or_default();
        *volume += 1;
        if let Some(seconds) = row.resolution_seconds {
            times.push(seconds as f64);
        }
    }

    let mut stats: Vec<AgentStats> = agents
        .into_iter()
        .filter_map(|(agent, (volume, times))| {
            mean(times)
                .filter(|mean| *mean > 0.0)
                .map(|mean_resolution_seconds| AgentStats {
                    agent: agent.to_string(),
                    volume,
                    mean_resolution_seconds,
                })
        })
        .collect();
    stats.sort_by(|a, b| {
        a.mean_resolution_seconds
            .partial_cmp(&b.mean_resolution_seconds)
            .unwrap_or(Ordering::Equal)
    });
    stats
}
