//! Endpoint health probe

use crate::config::Config;
use crate::error::{ChatGenieError, Result};
use crate::exchange::HttpChatClient;
use colored::Colorize;

/// Probe `GET /health` on the configured endpoint and print the result
///
/// # Errors
///
/// Returns `ChatGenieError::Exchange` when the service is unreachable or
/// unhealthy
pub async fn run_health(config: &Config) -> Result<()> {
    let client = HttpChatClient::new(&config.endpoint)?;
    let url = client.endpoint("/health");

    match client.health().await {
        Ok(status) => {
            let label = if status.status == "healthy" {
                status.status.green().bold()
            } else {
                status.status.yellow().bold()
            };
            println!("{} {}", url.cyan(), label);
            if let Some(version) = &status.version {
                println!("  version:   {}", version);
            }
            if let Some(timestamp) = &status.timestamp {
                println!("  timestamp: {}", timestamp);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", url.cyan(), e.to_string().red().bold());
            Err(ChatGenieError::Exchange(e).into())
        }
    }
}
