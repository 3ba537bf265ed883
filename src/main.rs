//! Campaign Inspector - Main entry point.
//!
//! Runs one inspection pass against the configured database and prints the
//! findings to stdout. Exits with status 1 on any failure.

use campaign_inspect::config::Config;
use campaign_inspect::{DatabaseInspector, DbError, DbResult};
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so they never interleave with the report on stdout.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Print the failure line. Write errors on a closed stdout are ignored.
fn report_failure<W: Write>(out: &mut W, err: &DbError) {
    let _ = writeln!(out, "❌ Database error: {}", err);
}

async fn run(config: &Config) -> DbResult<()> {
    let target = config.target()?;
    let mut inspector = DatabaseInspector::new(std::io::stdout().lock());
    inspector.run(&target).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env file is fine; the URL may come from flags or the environment.
    dotenvy::dotenv().ok();

    // Parse configuration from command line and environment
    let config = Config::parse();

    if config.enable_logs {
        init_tracing(&config);
    }

    info!("Starting campaign inspector v{}", env!("CARGO_PKG_VERSION"));

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(
                error = %e,
                sql_state = ?e.sql_state(),
                suggestion = ?e.suggestion(),
                "Inspection failed"
            );
            report_failure(&mut std::io::stdout(), &e);
            ExitCode::FAILURE
        }
    }
}
