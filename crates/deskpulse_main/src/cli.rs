use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Support teams the analyst view is scoped to.
pub const DEFAULT_TEAMS: [u64; 2] = [2975006, 1972225];

#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"), about = "Helpdesk conversation reports")]
pub struct Cli {
    /// Enable verbose output mode.
    ///
    /// Raises the default log level to debug.
    #[arg(long, default_value_t = false, global = true)]
    pub verbose: bool,

    /// Upper bound, in seconds, on the time one fetch may spend waiting out
    /// rate limits. Zero waits forever.
    #[arg(long, global = true, default_value_t = 900)]
    pub rate_limit_budget: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Management report over every conversation in a date range.
    Report(ReportArgs),

    /// Classification progress of one analyst.
    Analyst(AnalystArgs),

    /// Show what the API returns for one conversation.
    Inspect {
        /// Conversation id or inbox link
        reference: String,

        /// Also print the full JSON
        #[arg(long)]
        raw: bool,
    },

    /// List conversation attribute names and their labels.
    Attributes,
}

/// Inclusive range of local calendar days. Defaults to the last seven days.
#[derive(Args, Debug, Clone, Default)]
pub struct Period {
    /// First day, as YYYY-MM-DD or DD/MM/YYYY
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day, as YYYY-MM-DD or DD/MM/YYYY
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub period: Period,

    /// Restrict to conversations assigned to these team ids
    #[arg(long = "team")]
    pub teams: Vec<u64>,

    /// Attribute labels to analyse. Defaults to the usual reason, status and
    /// type columns.
    #[arg(long = "attribute")]
    pub attributes: Vec<String>,

    /// Number of entries in the combined reason ranking
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Order CSAT groups worst first
    #[arg(long)]
    pub worst_first: bool,

    /// Write the export bundle as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Post the headline figures to Slack
    #[arg(long)]
    pub alert: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalystArgs {
    /// Admin id or name. Without it, lists the analysts of the support teams.
    #[arg(long)]
    pub admin: Option<String>,

    #[command(flatten)]
    pub period: Period,

    /// Support team ids
    #[arg(long = "team", default_values_t = DEFAULT_TEAMS)]
    pub teams: Vec<u64>,

    /// Classification goal, as a fraction above 0 and at most 1
    #[arg(long, default_value_t = deskpulse_report::DEFAULT_GOAL, value_parser = parse_goal)]
    pub goal: f64,

    /// Post the pending count to Slack when the goal is missed
    #[arg(long)]
    pub alert: bool,
}

pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
        .map_err(|_| format!("invalid date '{input}', expected YYYY-MM-DD or DD/MM/YYYY"))
}

pub fn parse_goal(input: &str) -> Result<f64, String> {
    let goal: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid goal '{input}', expected a fraction such as 0.9"))?;
    if goal > 0.0 && goal <= 1.0 {
        Ok(goal)
    } else {
        Err(format!("goal {goal} is out of range, expected a fraction above 0 and at most 1"))
    }
}
