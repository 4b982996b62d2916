use anyhow::{Context, Result};
use clap::Parser;
use deskpulse_domain::FetchConfig;
use deskpulse_main::{init_tracing, load_environment, App, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env = load_environment().context("Failed to load environment")?;
    let _guard = init_tracing(env.log_path(), cli.verbose)?;

    let budget = cli.rate_limit_budget;
    let config = FetchConfig::default().rate_limit_budget_secs((budget > 0).then_some(budget));

    App::init(env, config)?.run(cli.command).await
}
