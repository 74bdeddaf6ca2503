//! Candlelight CLI entry point.

use anyhow::Result;
use candlelight::cli::{commands, Cli, Commands};
use candlelight::config::{Credentials, Settings};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_deref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("candlelight={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Resolved once; each command checks the keys it needs.
    let credentials = Credentials::from_env(&settings);

    // Execute command
    match &cli.command {
        Commands::Build {
            dataset,
            source_column,
            format,
        } => {
            commands::run_build(
                dataset.clone(),
                source_column.clone(),
                *format,
                settings,
                &credentials,
            )
            .await?;
        }

        Commands::Ask { question, model } => {
            commands::run_ask(question, model.clone(), settings, &credentials).await?;
        }

        Commands::Chat { model } => {
            commands::run_chat(model.clone(), settings, &credentials).await?;
        }

        Commands::Search {
            query,
            limit,
            min_score,
        } => {
            commands::run_search(query, *limit, *min_score, settings, &credentials).await?;
        }

        Commands::Status => {
            commands::run_status(settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings, &credentials).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, config_path).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
