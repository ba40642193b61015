use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::api::format;
use crate::app::AppState;
use crate::auth::Actor;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /logout - revoke the token used for this request
pub async fn logout(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Value> {
    let identity = actor.identity()?;
    state.accounts().logout(identity).await?;
    Ok(ApiResponse::success(format::message("Logged out successfully.")))
}

/// GET /user - the caller's account with its effective role and scopes
pub async fn whoami(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Value> {
    let identity = actor.identity()?;
    let user = state.accounts().current_user(identity).await?;
    Ok(ApiResponse::success(json!({
        "message": "Authenticated user.",
        "user": format::identity_to_api_value(&user, identity),
    })))
}
