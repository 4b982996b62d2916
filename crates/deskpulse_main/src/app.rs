use anyhow::{bail, Context, Result};
use chrono::Local;
use colored::Colorize;
use deskpulse_domain::{
    AdminDirectory, AttributeLabels, ConversationId, Environment, FetchConfig, Operator,
    SearchQuery,
};
use deskpulse_provider::{HelpdeskClient, SlackNotifier};
use deskpulse_report::{
    agent_performance, agent_volume, classification_goal, cross_tab, csat, distribution, pending,
    top_reasons, CsatOrder, Flattener, ReportColumns, Session,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::{AnalystArgs, Command, ReportArgs, DEFAULT_TEAMS};
use crate::progress::ConsoleProgress;
use crate::{dates, render};

/// What a command produced: the text to print and, when a fetch stopped
/// early, why.
#[derive(Debug, Default)]
pub struct Output {
    pub text: String,
    pub incomplete: Option<String>,
}

impl Output {
    fn text(text: String) -> Self {
        Self { text, incomplete: None }
    }
}

pub struct App {
    env: Environment,
    client: HelpdeskClient,
    notifier: SlackNotifier,
    columns: ReportColumns,
    session: Session,
}

impl App {
    pub fn init(env: Environment, config: FetchConfig) -> Result<Self> {
        let client = HelpdeskClient::new(&env, config).context("Failed to create API client")?;
        let notifier = SlackNotifier::new(env.slack_webhook.clone())
            .context("Failed to create Slack notifier")?;
        Ok(Self {
            env,
            client,
            notifier,
            columns: ReportColumns::default(),
            session: Session::new(),
        })
    }

    /// Runs `command` and prints its output. A fetch that stopped early still
    /// prints what it got, then fails.
    pub async fn run(&mut self, command: Command) -> Result<()> {
        let output = self.execute(command).await?;
        print!("{}", output.text);

        if let Some(reason) = output.incomplete {
            eprintln!("{}", "Results are incomplete.".red().bold());
            bail!(reason);
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> Result<Output> {
        match command {
            Command::Report(args) => self.report(args).await,
            Command::Analyst(args) => self.analyst(args).await,
            Command::Inspect { reference, raw } => self.inspect(&reference, raw).await,
            Command::Attributes => {
                let labels = self
                    .client
                    .attribute_labels()
                    .await
                    .context("Failed to load conversation attributes")?;
                Ok(Output::text(render::labels(&labels)))
            }
        }
    }

    fn flattener(&self) -> Flattener<Local> {
        Flattener::new(self.env.workspace_id.clone()).in_timezone(Local)
    }

    async fn alert(&self, text: &str) {
        if !self.notifier.is_configured() {
            eprintln!("{}", "No Slack webhook configured, alert not sent.".yellow());
            return;
        }
        if let Err(error) = self.notifier.send(text).await {
            warn!(error = %error, "Slack alert failed");
            eprintln!("{} {error}", "Slack alert failed:".yellow());
        }
    }

    async fn report(&mut self, args: ReportArgs) -> Result<Output> {
        let (from, to) = dates::resolve(&args.period, Local::now().date_naive());
        let (start, end) = dates::day_window(from, to, &Local)?;
        let query = SearchQuery::created_between(start, end).in_teams(&args.teams);
        info!(%from, %to, teams = ?args.teams, "Building report");

        let (labels, admins, outcome) = tokio::join!(
            self.client.attribute_labels(),
            self.client.admins(),
            self.client.search_conversations(&query, &ConsoleProgress),
        );
        self.session.labels = labels.unwrap_or_else(|error| {
            warn!(error = %error, "Attribute labels unavailable, using raw names");
            AttributeLabels::default()
        });
        self.session.admins = admins.unwrap_or_else(|error| {
            warn!(error = %error, "Admin directory unavailable, using ids");
            AdminDirectory::default()
        });

        let flattener = self.flattener();
        let incomplete = outcome
            .failure
            .as_ref()
            .map(|error| format!("Fetch stopped after {} pages: {error}", outcome.pages));
        let report = self.session.load(&flattener, &outcome.records, outcome.is_complete());
        let columns = &self.columns;

        let mut text = format!("Report {from} to {to}\n\n");
        if report.rows.is_empty() {
            text.push_str("No conversations found.\n");
            return Ok(Output { text, incomplete });
        }

        let kpis = report.kpis(columns);
        let selected = report.selection(columns, &args.attributes);
        let rows = &report.rows;
        let available = report.attribute_columns();
        let has = |column: &str| available.iter().any(|c| c == column);

        let mut sections = vec![render::kpis(&kpis)];
        sections.extend(
            selected
                .iter()
                .map(|column| render::shares(column, &distribution(rows, column))),
        );
        sections.push(render::shares("Volume by agent", &agent_volume(rows)));
        sections.push(render::agents(&agent_performance(rows)));

        let crossings = [
            (&columns.reason, &columns.status, "Status by reason"),
            (&columns.reason, &columns.service_type, "Type by reason"),
            (&columns.service_type, &columns.status, "Status by type"),
        ];
        for (group, value, title) in crossings {
            if has(group) && has(value) {
                sections.push(render::cross_tab(title, &cross_tab(rows, group, value)));
            }
        }

        if has(&columns.reason) && has(&columns.second_reason) {
            let ranking = top_reasons(rows, &columns.reason, &columns.second_reason, args.top);
            sections.push(render::shares(&format!("Top {} reasons", args.top), &ranking));
        }

        let order = if args.worst_first { CsatOrder::WorstFirst } else { CsatOrder::BestFirst };
        sections.push(render::csat(csat(rows, &columns.reason, order).as_ref(), &columns.reason));

        text.push_str(&sections.join("\n"));

        if let Some(path) = &args.export {
            let bundle = report.export(&selected);
            let json = serde_json::to_vec_pretty(&bundle).context("Failed to encode export")?;
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            text.push_str(&format!("\nExport written to {}\n", path.display()));
        }

        if args.alert {
            let mut message = format!(
                "Report {from} to {to}: {} conversations, {} classified, {} resolved. Top reason: {}",
                kpis.total,
                kpis.classified,
                kpis.resolved,
                kpis.top_reason.as_deref().unwrap_or("N/A")
            );
            if incomplete.is_some() {
                message.push_str(" (partial)");
            }
            self.alert(&message).await;
        }

        Ok(Output { text, incomplete })
    }

    async fn analyst(&mut self, args: AnalystArgs) -> Result<Output> {
        self.session.admins = self.client.admins().await.context("Failed to load admins")?;

        let Some(wanted) = args.admin.as_deref() else {
            let teams = self.client.teams().await.unwrap_or_else(|error| {
                warn!(error = %error, "Team list unavailable, using ids");
                Vec::new()
            });
            let names: Vec<String> = args
                .teams
                .iter()
                .map(|id| {
                    let id = id.to_string();
                    teams
                        .iter()
                        .find(|team| team.id == id)
                        .map_or(id, |team| team.name.clone())
                })
                .collect();

            let members = self.session.admins.members_of(&args.teams);
            let mut text = format!("Analysts of {}\n", names.join(", "));
            for admin in members {
                let name = admin.name.as_deref().unwrap_or_default();
                text.push_str(&format!("  {name} ({})\n", admin.id));
            }
            return Ok(Output::text(text));
        };

        let admin = self.session.admins.find(wanted)?.clone();
        let name = admin.name.clone().unwrap_or_else(|| format!("ID {}", admin.id));
        if !self
            .session
            .admins
            .members_of(&args.teams)
            .iter()
            .any(|member| member.id == admin.id)
        {
            warn!(admin = %admin.id, teams = ?args.teams, "Admin is not in the selected teams");
        }

        let (from, to) = dates::resolve(&args.period, Local::now().date_naive());
        let (start, end) = dates::day_window(from, to, &Local)?;
        // Admin ids are numeric on the wire.
        let admin_value = admin
            .id
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(admin.id.clone()));
        let query = SearchQuery::created_between(start, end)
            .field("admin_assignee_id", Operator::Eq, admin_value)
            .field("state", Operator::Eq, "closed")
            .in_teams(&args.teams);
        info!(admin = %admin.id, %from, %to, "Loading analyst conversations");

        let columns = &self.columns;
        let (labels, outcome) = tokio::join!(
            self.client.attribute_labels(),
            self.client.search_conversations_matching(
                &query,
                |conversation| !columns.is_back_office(conversation),
                &ConsoleProgress,
            ),
        );
        self.session.labels = labels.unwrap_or_else(|error| {
            warn!(error = %error, "Attribute labels unavailable, using raw names");
            AttributeLabels::default()
        });

        let flattener = self.flattener();
        let incomplete = outcome
            .failure
            .as_ref()
            .map(|error| format!("Fetch stopped after {} pages: {error}", outcome.pages));
        let report = self.session.load(&flattener, &outcome.records, outcome.is_complete());

        if report.rows.is_empty() {
            let text = format!("{name}: no closed conversations between {from} and {to}.\n");
            return Ok(Output { text, incomplete });
        }

        let goal = classification_goal(&report.rows, &self.columns.reason, args.goal);
        let pending_rows = pending(&report.rows, &self.columns.reason);
        let text = format!("{}\n{}", render::goal(&name, &goal), render::pending(&pending_rows));

        if args.alert && !goal.met {
            let message = format!(
                "{name}: {} closed conversations without a reason, {} to go for {:.0}%.",
                goal.pending,
                goal.remaining,
                goal.goal * 100.0
            );
            self.alert(&message).await;
        }

        Ok(Output { text, incomplete })
    }

    async fn inspect(&self, reference: &str, raw: bool) -> Result<Output> {
        let id = ConversationId::parse_reference(reference)?;
        let conversation = self
            .client
            .conversation(&id)
            .await
            .with_context(|| format!("Failed to fetch conversation {id}"))?;

        let mut text = render::inspection(&conversation, &DEFAULT_TEAMS);
        if raw {
            text.push('\n');
            text.push_str(&serde_json::to_string_pretty(&conversation)?);
            text.push('\n');
        }
        Ok(Output::text(text))
    }
}
