use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use crate::api::{format, input};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /register - create a `user` account and return its first token
pub async fn register(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = body?;
    let registration = input::register(&body, state.config.security.min_password_length)?;

    let session = state.accounts().register(registration).await?;
    Ok(ApiResponse::created(format::session_to_api_value(
        "User registered successfully.",
        &session.user,
        &session.token.token,
        None,
    )))
}
