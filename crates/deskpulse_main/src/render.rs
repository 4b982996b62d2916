use std::fmt::Display;

use colored::Colorize;
use deskpulse_domain::{AttributeLabels, Conversation};
use deskpulse_report::{
    format_duration, AgentStats, ClassificationGoal, ConversationRow, CrossCell, CsatSummary,
    Kpis, Share,
};
use serde_json::Value;

fn heading(title: &str) -> String {
    format!("{}\n", title.bold().bright_yellow())
}

fn line(out: &mut String, text: impl Display) {
    out.push_str(&format!("  {text}\n"));
}

fn item(out: &mut String, label: &str, value: impl Display) {
    line(out, format!("{label}: {value}"));
}

fn empty(out: &mut String) {
    line(out, "(no data)");
}

pub fn kpis(kpis: &Kpis) -> String {
    let mut out = heading("Summary");
    item(&mut out, "Conversations", kpis.total);
    item(&mut out, "Classified", kpis.classified);
    item(&mut out, "Resolved", kpis.resolved);
    item(&mut out, "Mean resolution", format_duration(kpis.mean_resolution_seconds));
    item(&mut out, "Top reason", kpis.top_reason.as_deref().unwrap_or("N/A"));
    out
}

pub fn shares(title: &str, shares: &[Share]) -> String {
    let mut out = heading(title);
    if shares.is_empty() {
        empty(&mut out);
    }
    for share in shares {
        item(&mut out, &share.value, format!("{} ({:.1}%)", share.count, share.percent));
    }
    out
}

pub fn cross_tab(title: &str, cells: &[CrossCell]) -> String {
    let mut out = heading(title);
    if cells.is_empty() {
        empty(&mut out);
    }
    for cell in cells {
        let label = format!("{} / {}", cell.group, cell.value);
        item(&mut out, &label, format!("{} ({:.0}%)", cell.count, cell.percent));
    }
    out
}

pub fn csat(summary: Option<&CsatSummary>, group_by: &str) -> String {
    let mut out = heading(&format!("CSAT by {group_by}"));
    let Some(summary) = summary else {
        line(&mut out, "No ratings.");
        return out;
    };

    item(&mut out, "Mean", format!("{:.2}/5.0", summary.mean));
    item(&mut out, "Ratings", summary.count);
    for group in &summary.by_group {
        item(&mut out, &group.group, format!("{:.2} ({})", group.mean, group.count));
    }
    out
}

pub fn agents(stats: &[AgentStats]) -> String {
    let mut out = heading("Resolution time by agent");
    if stats.is_empty() {
        empty(&mut out);
    }
    for agent in stats {
        let value = format!(
            "{} conversations, mean {}",
            agent.volume,
            format_duration(Some(agent.mean_resolution_seconds))
        );
        item(&mut out, &agent.agent, value);
    }
    out
}

pub fn goal(name: &str, goal: &ClassificationGoal) -> String {
    let target = goal.goal * 100.0;
    let mut out = heading(name);
    item(&mut out, "Support conversations", goal.total);
    item(&mut out, "Pending classification", goal.pending);
    item(&mut out, "Rate", format!("{:.1}% (goal {:.0}%)", goal.rate, target));
    if goal.met {
        line(&mut out, "Goal met!".green());
    } else {
        let message = format!(
            "{} more conversations needed to reach {:.0}%.",
            goal.remaining, target
        );
        line(&mut out, message.red());
    }
    out
}

pub fn pending(rows: &[&ConversationRow]) -> String {
    let mut out = heading("Pending");
    if rows.is_empty() {
        line(&mut out, "Nothing pending.");
    }
    for row in rows {
        line(&mut out, format!("{}  {}  {}", row.date, row.id, row.link));
    }
    out
}

fn display_field(conversation: &Conversation, field: &str) -> String {
    match conversation.get(field) {
        Some(Value::String(text)) => text.clone(),
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}

/// Fields that decide whether a conversation shows up in the analyst view.
pub fn inspection(conversation: &Conversation, teams: &[u64]) -> String {
    let id = display_field(conversation, "id");
    let mut out = heading(&format!("Conversation {id}"));

    let team = conversation.team_assignee_id();
    let in_scope = team
        .as_deref()
        .and_then(|team| team.parse::<u64>().ok())
        .is_some_and(|team| teams.contains(&team));
    let team = match team {
        Some(team) if in_scope => format!("{team} (support team)"),
        Some(team) => format!("{team} (outside support teams)"),
        None => "-".to_string(),
    };

    item(&mut out, "Team", team);
    item(&mut out, "Admin", display_field(conversation, "admin_assignee_id"));
    item(&mut out, "State", display_field(conversation, "state"));

    out.push_str(&heading("Custom attributes"));
    let mut any = false;
    for (name, value) in conversation.custom_attributes() {
        any = true;
        let value = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        item(&mut out, name, value);
    }
    if !any {
        empty(&mut out);
    }
    out
}

pub fn labels(labels: &AttributeLabels) -> String {
    let mut out = heading("Conversation attributes");
    if labels.is_empty() {
        empty(&mut out);
    }
    for (name, label) in labels.iter() {
        line(&mut out, format!("{name} -> {label}"));
    }
    out
}
