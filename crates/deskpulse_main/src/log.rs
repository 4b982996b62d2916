use std::path::PathBuf;

use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DESKPULSE_LOG";

/// Keeps the background log writer alive. Drop it last.
pub struct Guard(#[allow(dead_code)] WorkerGuard);

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("deskpulse=debug")
    } else {
        EnvFilter::new("deskpulse=info")
    }
}

/// Sends JSON logs to a daily rolling file under `log_path`. `DESKPULSE_LOG`
/// overrides the level filter.
pub fn init_tracing(log_path: PathBuf, verbose: bool) -> anyhow::Result<Guard> {
    let append = tracing_appender::rolling::daily(&log_path, "deskpulse.log");
    let (writer, guard) = tracing_appender::non_blocking(append);

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbose)))
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_thread_ids(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;

    debug!(path = %log_path.display(), "Logging initialised");
    Ok(Guard(guard))
}
