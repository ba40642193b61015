use std::sync::Arc;

use crate::app::AppState;
use crate::config::AppConfig;
use crate::database::MemoryStore;
use crate::services::Session;
use crate::types::Role;

pub const TEST_SECRET: &str = "unit-test-secret";

/// In-memory application state with helpers for minting sessions
pub struct TestContext {
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            state: AppState::new(store, AppConfig::in_memory(TEST_SECRET)),
        }
    }

    /// Create an account with `role` and log it in
    pub async fn session(&self, email: &str, role: Role) -> anyhow::Result<Session> {
        let accounts = self.state.accounts();
        accounts
            .create_user("Test", email, "password", role)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create test user: {}", e))?;

        accounts
            .login(crate::api::input::LoginInput {
                email: email.to_string(),
                password: "password".to_string(),
            })
            .await
            .map_err(|e| anyhow::anyhow!("Failed to log in test user: {}", e))
    }

    pub async fn bearer(&self, email: &str, role: Role) -> anyhow::Result<String> {
        Ok(format!("Bearer {}", self.session(email, role).await?.token.token))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
