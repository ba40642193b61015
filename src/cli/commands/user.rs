use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::api::format::user_to_api_value;
use crate::cli::utils::{open_store, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::services::AccountService;
use crate::types::Role;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an account")]
    Create {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (generated if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Grant the admin role")]
        admin: bool,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create {
            name,
            email,
            password,
            admin,
        } => {
            let generated = password.is_none();
            let password = password.unwrap_or_else(|| Uuid::new_v4().simple().to_string()[..16].to_string());
            let role = if admin { Role::Admin } else { Role::User };

            let accounts = AccountService::new(open_store().await?, config::config().security.clone());
            let user = accounts.create_user(&name, &email, &password, role).await?;

            let mut data = json!({ "user": user_to_api_value(&user) });
            if generated {
                data["password"] = json!(password);
                if matches!(output_format, OutputFormat::Text) {
                    println!("Generated password: {}", password);
                }
            }
            output_success(
                output_format,
                &format!("Created {} account {} <{}>", user.role, user.id, user.email),
                Some(data),
            )
        }
    }
}
