#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use it_drinks_api::config::AppConfig;
use it_drinks_api::database::MemoryStore;
use it_drinks_api::types::Role;
use it_drinks_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "password123";

/// Router over a fresh in-memory store, driven in-process
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::in_memory(SECRET))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(Arc::new(MemoryStore::new()), config);
        let router = app(state.clone());
        Self { state, router }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    /// Send a raw body, e.g. malformed JSON
    pub async fn request_raw(&self, method: Method, uri: &str, token: Option<&str>, raw: &str) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(raw.to_string()))?).await
    }

    async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Create an account directly and log it in over HTTP; returns the token
    pub async fn login_as(&self, email: &str, role: Role) -> Result<String> {
        self.state
            .accounts()
            .create_user("Tester", email, PASSWORD, role)
            .await
            .map_err(|e| anyhow::anyhow!("failed to create {}: {}", email, e))?;

        let (status, body) = self.post("/login", None, json!({ "email": email, "password": PASSWORD })).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        body["token"].as_str().map(str::to_string).context("login response without token")
    }

    pub async fn admin(&self) -> Result<String> {
        self.login_as("admin@drinks.test", Role::Admin).await
    }

    pub async fn user(&self) -> Result<String> {
        self.login_as("user@drinks.test", Role::User).await
    }

    /// POST /ingredients as `token`, returning the new id
    pub async fn ingredient(&self, token: &str, name: &str, classification: &str, abv: f64) -> Result<i64> {
        let (status, body) = self
            .post(
                "/ingredients",
                Some(token),
                json!({ "name": name, "classification": classification, "alcohol_content": abv }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "ingredient create failed: {} {}", status, body);
        body["id"].as_i64().context("ingredient without id")
    }

    /// POST /cocktails as `token` with (ingredient id, ml) pairs, returning the new id
    pub async fn cocktail(&self, token: &str, name: &str, items: &[(i64, f64)]) -> Result<i64> {
        let ingredients: Vec<Value> = items
            .iter()
            .map(|(id, ml)| json!({ "id": id, "measure_ml": ml }))
            .collect();
        let (status, body) = self
            .post("/cocktails", Some(token), json!({ "name": name, "ingredients": ingredients }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "cocktail create failed: {} {}", status, body);
        body["id"].as_i64().context("cocktail without id")
    }
}

/// Ids of the ingredients attached to a cocktail response body
pub fn ingredient_ids(cocktail: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = cocktail["ingredients"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["id"].as_i64()).collect())
        .unwrap_or_default();
    ids.sort_unstable();
    ids
}

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The real binary, started once per test process on a free port with
/// in-memory storage and seeded demo data
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_it-drinks-api"))
            .env("DRINKS_API_PORT", port.to_string())
            .env("DRINKS_API_HOST", "127.0.0.1")
            .env("DRINKS_STORAGE", "memory")
            .env("DRINKS_SEED", "true")
            .env("JWT_SECRET", SECRET)
            .env("SECURITY_BCRYPT_COST", "4")
            .env("APP_ENV", "development")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}
