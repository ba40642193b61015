use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::api::{format, input};
use crate::app::AppState;
use crate::auth::{authorize, Actor};
use crate::database::models::CocktailDetail;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::cocktail_service::NOT_FOUND;
use crate::types::{Operation, Resource};

const RESOURCE: Resource = Resource::Cocktail;

/// GET /cocktails - every cocktail with its ingredients and pivot measures
pub async fn index(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<CocktailDetail>> {
    authorize(&actor, Operation::List, RESOURCE)?;
    Ok(ApiResponse::success(state.cocktails().list().await?))
}

/// GET /cocktails/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<CocktailDetail> {
    authorize(&actor, Operation::View, RESOURCE)?;
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(ApiResponse::success(state.cocktails().show(id).await?))
}

/// POST /cocktails - optionally with an initial `ingredients` list
pub async fn store(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<CocktailDetail> {
    authorize(&actor, Operation::Create, RESOURCE)?;
    let Json(body) = body?;
    let cocktail = input::new_cocktail(&body)?;
    Ok(ApiResponse::created(state.cocktails().create(cocktail).await?))
}

/// PUT|PATCH /cocktails/:id - a present `ingredients` list replaces the set
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<CocktailDetail> {
    authorize(&actor, Operation::Update, RESOURCE)?;
    let service = state.cocktails();
    let id = service.show(parse_id(&id, NOT_FOUND)?).await?.id();

    let Json(body) = body?;
    let changes = input::cocktail_changes(&body)?;
    Ok(ApiResponse::success(service.update(id, changes).await?))
}

/// DELETE /cocktails/:id - ingredients are kept
pub async fn destroy(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    authorize(&actor, Operation::Delete, RESOURCE)?;
    state.cocktails().delete(parse_id(&id, NOT_FOUND)?).await?;
    Ok(ApiResponse::success(format::message("Cocktail deleted successfully")))
}

/// GET /cocktails/:id/alcohol-content
pub async fn alcohol_content(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    authorize(&actor, Operation::ViewAlcoholContent, RESOURCE)?;
    let cocktail = state.cocktails().show(parse_id(&id, NOT_FOUND)?).await?;
    Ok(ApiResponse::success(format::alcohol_to_api_value(&cocktail)))
}
