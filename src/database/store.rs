use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AccessToken, CocktailChanges, CocktailDetail, Ingredient, IngredientChanges, NewCocktail, NewIngredient, NewUser,
    User,
};

/// Persistence seam used by the services. Implementations must apply
/// cocktail association changes atomically: a concurrent reader observes either
/// the old association set or the new one. Partial updates merge against the
/// row as stored at write time, never a stale read.
#[async_trait]
pub trait Store: Send + Sync {
    /// Storage label reported by `/health`
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;

    // Users
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    // Access tokens
    async fn insert_token(&self, token: &AccessToken) -> Result<(), DatabaseError>;
    async fn find_token(&self, id: Uuid) -> Result<Option<AccessToken>, DatabaseError>;
    /// Returns false when the token does not exist
    async fn revoke_token(&self, id: Uuid) -> Result<bool, DatabaseError>;
    /// Delete revoked and expired tokens, for one user or for everyone.
    /// Returns the number removed.
    async fn purge_inactive_tokens(&self, user_id: Option<i64>, now: DateTime<Utc>) -> Result<u64, DatabaseError>;

    // Ingredients
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DatabaseError>;
    async fn find_ingredient(&self, id: i64) -> Result<Option<Ingredient>, DatabaseError>;
    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>, DatabaseError>;
    async fn insert_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient, DatabaseError>;
    /// Merge `changes` into the stored row; `None` when it does not exist
    async fn update_ingredient(&self, id: i64, changes: IngredientChanges)
        -> Result<Option<Ingredient>, DatabaseError>;
    /// Deletes the ingredient and its cocktail associations
    async fn delete_ingredient(&self, id: i64) -> Result<bool, DatabaseError>;

    // Cocktails. Insert and update fail with `MissingIngredients` when a
    // requested ingredient does not exist at write time.
    async fn list_cocktails(&self) -> Result<Vec<CocktailDetail>, DatabaseError>;
    async fn find_cocktail(&self, id: i64) -> Result<Option<CocktailDetail>, DatabaseError>;
    async fn find_cocktail_by_name(&self, name: &str) -> Result<Option<CocktailDetail>, DatabaseError>;
    async fn insert_cocktail(&self, cocktail: NewCocktail) -> Result<CocktailDetail, DatabaseError>;
    /// Apply attribute changes and, when present, replace the association set
    async fn update_cocktail(&self, id: i64, changes: CocktailChanges)
        -> Result<Option<CocktailDetail>, DatabaseError>;
    /// Deletes the cocktail and its associations, never the ingredients
    async fn delete_cocktail(&self, id: i64) -> Result<bool, DatabaseError>;
    async fn cocktails_with_ingredient(&self, ingredient_id: i64) -> Result<Vec<CocktailDetail>, DatabaseError>;
}
