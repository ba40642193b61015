// Public handlers: service descriptor, health check and token acquisition.
pub mod auth;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service descriptor
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "It Drinks API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Cocktail and ingredient catalogue with alcohol content calculation",
        "endpoints": {
            "auth": "/register, /login (public); /logout, /user (token)",
            "ingredients": "/ingredients[/:id]",
            "cocktails": "/cocktails[/:id]",
            "alcohol": "/cocktails/:id/alcohol-content",
            "search": "/search/:ingredient_id",
            "health": "/health",
        }
    }))
}

/// GET /health - 200 when storage answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "storage": backend,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed for {} storage: {}", backend, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "storage": backend,
                    "error": "storage unavailable",
                })),
            )
        }
    }
}
