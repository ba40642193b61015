use std::sync::Arc;
use tracing::info;

use crate::api::input::validation_result;
use crate::database::models::{CocktailChanges, CocktailDetail, Measure, NewCocktail};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::services::ingredient_service;

pub const NOT_FOUND: &str = "Cocktail not found";
pub const NO_MATCHES: &str = "No cocktails found with this ingredient";

pub struct CocktailService {
    store: Arc<dyn Store>,
}

impl CocktailService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<CocktailDetail>, ApiError> {
        Ok(self.store.list_cocktails().await?)
    }

    pub async fn show(&self, id: i64) -> Result<CocktailDetail, ApiError> {
        self.store
            .find_cocktail(id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))
    }

    pub async fn create(&self, cocktail: NewCocktail) -> Result<CocktailDetail, ApiError> {
        let requested = ingredient_ids(&cocktail.ingredients);
        let created = self
            .store
            .insert_cocktail(cocktail)
            .await
            .map_err(|e| invalid_ingredients(e, &requested))?;
        info!(
            "Created cocktail {} '{}' with {} ingredients",
            created.id(),
            created.name(),
            created.ingredients.len()
        );
        Ok(created)
    }

    /// Apply attribute changes; a present ingredient list replaces the whole set
    pub async fn update(&self, id: i64, changes: CocktailChanges) -> Result<CocktailDetail, ApiError> {
        let requested = changes.ingredients.as_deref().map(ingredient_ids).unwrap_or_default();
        let updated = self
            .store
            .update_cocktail(id, changes)
            .await
            .map_err(|e| invalid_ingredients(e, &requested))?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        info!("Updated cocktail {} ({} ingredients)", id, updated.ingredients.len());
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if !self.store.delete_cocktail(id).await? {
            return Err(ApiError::not_found(NOT_FOUND));
        }
        info!("Deleted cocktail {}", id);
        Ok(())
    }

    /// Cocktails containing the ingredient; 404 when the ingredient is unknown
    /// or nothing uses it
    pub async fn search_by_ingredient(&self, ingredient_id: i64) -> Result<Vec<CocktailDetail>, ApiError> {
        if self.store.find_ingredient(ingredient_id).await?.is_none() {
            return Err(ApiError::not_found(ingredient_service::NOT_FOUND));
        }
        let cocktails = self.store.cocktails_with_ingredient(ingredient_id).await?;
        if cocktails.is_empty() {
            return Err(ApiError::not_found(NO_MATCHES));
        }
        Ok(cocktails)
    }
}

fn ingredient_ids(measures: &[Measure]) -> Vec<i64> {
    measures.iter().map(|m| m.ingredient_id).collect()
}

/// Point missing ingredients at their position in the request
fn invalid_ingredients(err: DatabaseError, requested: &[i64]) -> ApiError {
    let DatabaseError::MissingIngredients(missing) = &err else {
        return err.into();
    };
    let errors = requested
        .iter()
        .enumerate()
        .filter(|(_, id)| missing.contains(id))
        .map(|(index, _)| {
            let field = format!("ingredients.{}.id", index);
            let problem = format!("The selected {} is invalid.", field);
            (field, problem)
        })
        .collect();
    validation_result(errors).err().unwrap_or_else(|| err.into())
}
