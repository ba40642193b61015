use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{open_store, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;
use crate::services::{AccountService, SeedService};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create tables and indexes if missing (PostgreSQL)")]
    Init,

    #[command(about = "Load the admin account, ingredients and recipes (idempotent)")]
    Seed,

    #[command(about = "Delete revoked and expired access tokens")]
    PruneTokens,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init => {
            let mut database = config::config().database.clone();
            // connect() runs the bootstrap only when asked to
            database.init_schema = true;
            DatabaseManager::connect(&database)
                .await
                .context("schema bootstrap failed")?;
            output_success(output_format, "Database schema is ready", None)
        }
        DbCommands::Seed => {
            let store = open_store().await?;
            let accounts = AccountService::new(store.clone(), config::config().security.clone());
            let report = SeedService::new(store, accounts).run().await?;

            let message = format!(
                "Seeded {} ingredients and {} cocktails ({} re-synced)",
                report.ingredients_created, report.cocktails_created, report.cocktails_synced
            );
            output_success(output_format, &message, Some(json!({ "report": report })))
        }
        DbCommands::PruneTokens => {
            let store = open_store().await?;
            let removed = AccountService::new(store, config::config().security.clone())
                .prune_tokens()
                .await?;
            let message = format!("Removed {} inactive access tokens", removed);
            output_success(output_format, &message, Some(json!({ "removed": removed })))
        }
    }
}
