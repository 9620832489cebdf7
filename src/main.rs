//! ChatGenie - terminal chat client
//!
#![doc = "Main entry point for the ChatGenie command-line client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatgenie::cli::{Cli, Commands};
use chatgenie::commands;
use chatgenie::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat");
            let storage = commands::open_storage(&config, cli.ephemeral)?;
            commands::chat::run_chat(config, storage).await?;
            Ok(())
        }
        Commands::Send { text, new } => {
            tracing::debug!("Sending one-shot message");
            let storage = commands::open_storage(&config, cli.ephemeral)?;
            commands::send::run_send(config, storage, text.join(" "), new).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::debug!("Starting history command");
            let storage = commands::open_storage(&config, cli.ephemeral)?;
            commands::history::handle_history(command, &config, storage)?;
            Ok(())
        }
        Commands::Health => {
            commands::health::run_health(&config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "chatgenie=debug"
    } else {
        "chatgenie=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
