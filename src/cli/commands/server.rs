use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from API /health endpoint")]
    Health {
        #[arg(long, help = "Server base URL (defaults to the configured bind address)")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => {
            let base = url.unwrap_or_else(|| format!("http://127.0.0.1:{}", config::config().server.port));
            let endpoint = format!("{}/health", base.trim_end_matches('/'));

            let response = reqwest::get(&endpoint)
                .await
                .with_context(|| format!("failed to reach {}", endpoint))?;
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);

            if status.is_success() {
                output_success(
                    output_format,
                    &format!("{} is healthy", base),
                    Some(json!({ "status": status.as_u16(), "health": body })),
                )
            } else {
                output_error(
                    output_format,
                    &format!("{} answered {}", base, status),
                    Some("SERVER_UNHEALTHY"),
                )?;
                anyhow::bail!("server unhealthy")
            }
        }
    }
}
