//! transcript-harvest CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transcript_harvest::cli::{commands, Cli, Commands};
use transcript_harvest::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("transcript_harvest={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_deref())?;

    // Execute command
    match &cli.command {
        Commands::Split(args) => {
            commands::run_split(args, &settings)?;
        }

        Commands::Download(args) => {
            commands::run_download(args, settings).await?;
        }

        Commands::Merge(args) => {
            commands::run_merge(args, &settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, &settings, config_path.as_deref())?;
        }
    }

    Ok(())
}
