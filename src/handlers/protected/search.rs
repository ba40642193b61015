use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::auth::{authorize, Actor};
use crate::database::models::CocktailDetail;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ingredient_service::NOT_FOUND;
use crate::types::{Operation, Resource};

/// GET /search/:ingredient_id - cocktails that use the ingredient
pub async fn by_ingredient(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(ingredient_id): Path<String>,
) -> ApiResult<Vec<CocktailDetail>> {
    authorize(&actor, Operation::SearchByIngredient, Resource::Cocktail)?;
    let ingredient_id = parse_id(&ingredient_id, NOT_FOUND)?;
    Ok(ApiResponse::success(state.cocktails().search_by_ingredient(ingredient_id).await?))
}
