use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use owo_colors::OwoColorize;

use marketdesk::cli::Cli;

/// Log filter variable; falls back to RUST_LOG, then "warn".
const LOG_ENV: &str = "MARKETDESK_LOG";

fn init_tracing() {
    let env = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{} {}", "error:".red(), e.user_message());
            ExitCode::FAILURE
        }
    }
}
