use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use crate::api::{format, input};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /login - exchange email and password for a bearer token
///
/// Admin accounts receive the `admin` and `user` scopes, everyone else `user`.
/// Wrong credentials answer 401 with a message distinct from a missing token.
pub async fn login(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = body?;
    let credentials = input::login(&body)?;

    let session = state.accounts().login(credentials).await?;
    Ok(ApiResponse::success(format::session_to_api_value(
        "Login successful.",
        &session.user,
        &session.token.token,
        Some(session.token.record.scopes.as_slice()),
    )))
}
