//! Atelier - Conversational AI chat client
//!
#![doc = "Atelier - Conversational AI chat client"]
#![doc = "Main entry point for the Atelier application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atelier::cli::{Cli, Commands};
use atelier::commands;
use atelier::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a storage path on the CLI (or via env), mirror it
    // into ATELIER_SNAPSHOT_DB so the default snapshot initializer honors it.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("ATELIER_SNAPSHOT_DB", db_path);
        tracing::info!("Using snapshot DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { language, mode } => {
            tracing::info!("Starting interactive chat session");
            if let Some(l) = &language {
                tracing::debug!("Using language override: {}", l);
            }
            if let Some(m) = &mode {
                tracing::debug!("Using mode override: {}", m);
            }

            commands::chat::run_chat(config, language, mode).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(command, &config)?;
            Ok(())
        }
        Commands::Export {
            conversation,
            artifact,
            output,
        } => {
            tracing::info!("Starting artifact export");
            commands::export::run_export(&config, &conversation, &artifact, output).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("atelier=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
