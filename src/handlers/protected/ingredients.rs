use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::api::{format, input};
use crate::app::AppState;
use crate::auth::{authorize, Actor};
use crate::database::models::Ingredient;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ingredient_service::NOT_FOUND;
use crate::types::{Operation, Resource};

const RESOURCE: Resource = Resource::Ingredient;

/// GET /ingredients
pub async fn index(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Vec<Ingredient>> {
    authorize(&actor, Operation::List, RESOURCE)?;
    Ok(ApiResponse::success(state.ingredients().list().await?))
}

/// GET /ingredients/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<Ingredient> {
    authorize(&actor, Operation::View, RESOURCE)?;
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(ApiResponse::success(state.ingredients().show(id).await?))
}

/// POST /ingredients
pub async fn store(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Ingredient> {
    authorize(&actor, Operation::Create, RESOURCE)?;
    let Json(body) = body?;
    let ingredient = input::new_ingredient(&body)?;
    Ok(ApiResponse::created(state.ingredients().create(ingredient).await?))
}

/// PUT|PATCH /ingredients/:id - partial update; omitted fields keep their value
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Ingredient> {
    authorize(&actor, Operation::Update, RESOURCE)?;
    let service = state.ingredients();
    let id = service.show(parse_id(&id, NOT_FOUND)?).await?.id;

    let Json(body) = body?;
    let changes = input::ingredient_changes(&body)?;
    Ok(ApiResponse::success(service.update(id, changes).await?))
}

/// DELETE /ingredients/:id - cocktails using it lose the association only
pub async fn destroy(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    authorize(&actor, Operation::Delete, RESOURCE)?;
    state.ingredients().delete(parse_id(&id, NOT_FOUND)?).await?;
    Ok(ApiResponse::success(format::message("Ingredient deleted successfully")))
}
