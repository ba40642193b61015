use std::sync::Arc;
use tracing::info;

use crate::database::models::{Ingredient, IngredientChanges, NewIngredient};
use crate::database::Store;
use crate::error::ApiError;

pub const NOT_FOUND: &str = "Ingredient not found";

pub struct IngredientService {
    store: Arc<dyn Store>,
}

impl IngredientService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Ingredient>, ApiError> {
        Ok(self.store.list_ingredients().await?)
    }

    pub async fn show(&self, id: i64) -> Result<Ingredient, ApiError> {
        self.store
            .find_ingredient(id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))
    }

    pub async fn create(&self, ingredient: NewIngredient) -> Result<Ingredient, ApiError> {
        let created = self.store.insert_ingredient(ingredient).await?;
        info!(
            "Created ingredient {} '{}' ({}, {}%)",
            created.id, created.name, created.classification, created.alcohol_content
        );
        Ok(created)
    }

    /// Merge `changes` into the stored ingredient
    pub async fn update(&self, id: i64, changes: IngredientChanges) -> Result<Ingredient, ApiError> {
        let updated = self
            .store
            .update_ingredient(id, changes)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        info!("Updated ingredient {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if !self.store.delete_ingredient(id).await? {
            return Err(ApiError::not_found(NOT_FOUND));
        }
        info!("Deleted ingredient {}", id);
        Ok(())
    }
}
