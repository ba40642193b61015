use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    plan_sync, AccessToken, Cocktail, CocktailChanges, CocktailDetail, CocktailIngredient, Ingredient,
    IngredientChanges, Measure, NewCocktail, NewIngredient, NewUser, Pivot, User,
};
use crate::database::store::Store;

#[derive(Default)]
struct MemoryState {
    last_user_id: i64,
    last_ingredient_id: i64,
    last_cocktail_id: i64,
    users: BTreeMap<i64, User>,
    tokens: HashMap<Uuid, AccessToken>,
    ingredients: BTreeMap<i64, Ingredient>,
    cocktails: BTreeMap<i64, Cocktail>,
    /// Keyed by (cocktail_id, ingredient_id)
    pivots: BTreeMap<(i64, i64), Pivot>,
}

impl MemoryState {
    fn detail(&self, cocktail: &Cocktail) -> CocktailDetail {
        let ingredients = self
            .pivots
            .range((cocktail.id, i64::MIN)..=(cocktail.id, i64::MAX))
            .filter_map(|(_, pivot)| {
                self.ingredients.get(&pivot.ingredient_id).map(|ingredient| CocktailIngredient {
                    ingredient: ingredient.clone(),
                    pivot: pivot.clone(),
                })
            })
            .collect();

        CocktailDetail {
            cocktail: cocktail.clone(),
            ingredients,
        }
    }

    fn measures(&self, cocktail_id: i64) -> Vec<Measure> {
        self.pivots
            .range((cocktail_id, i64::MIN)..=(cocktail_id, i64::MAX))
            .map(|(_, pivot)| Measure {
                ingredient_id: pivot.ingredient_id,
                measure_ml: pivot.measure_ml,
            })
            .collect()
    }

    /// Fails when any requested ingredient is gone
    fn ensure_ingredients(&self, desired: &[Measure]) -> Result<(), DatabaseError> {
        let missing: Vec<i64> = desired
            .iter()
            .map(|m| m.ingredient_id)
            .filter(|id| !self.ingredients.contains_key(id))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DatabaseError::MissingIngredients(missing))
        }
    }

    /// Replace the association set of `cocktail_id` with `desired`
    fn sync(&mut self, cocktail_id: i64, desired: &[Measure]) {
        let plan = plan_sync(&self.measures(cocktail_id), desired);
        let now = Utc::now();

        for ingredient_id in &plan.detach {
            self.pivots.remove(&(cocktail_id, *ingredient_id));
        }
        for measure in plan.upserts() {
            self.pivots
                .entry((cocktail_id, measure.ingredient_id))
                .and_modify(|pivot| {
                    pivot.measure_ml = measure.measure_ml;
                    pivot.updated_at = now;
                })
                .or_insert_with(|| Pivot {
                    cocktail_id,
                    ingredient_id: measure.ingredient_id,
                    measure_ml: measure.measure_ml,
                    created_at: now,
                    updated_at: now,
                });
        }
    }
}

/// Process-local store. Every mutation runs under one write lock, so
/// association replacement is atomic with respect to readers.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict {
                field: "email",
                message: "The email has already been taken.".to_string(),
            });
        }

        state.last_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: state.last_user_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_token(&self, token: &AccessToken) -> Result<(), DatabaseError> {
        self.state.write().await.tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_token(&self, id: Uuid) -> Result<Option<AccessToken>, DatabaseError> {
        Ok(self.state.read().await.tokens.get(&id).cloned())
    }

    async fn revoke_token(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        match state.tokens.get_mut(&id) {
            Some(token) => {
                token.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_inactive_tokens(&self, user_id: Option<i64>, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let mut state = self.state.write().await;
        let before = state.tokens.len();
        state
            .tokens
            .retain(|_, token| user_id.is_some_and(|id| id != token.user_id) || token.is_active(now));
        Ok((before - state.tokens.len()) as u64)
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DatabaseError> {
        Ok(self.state.read().await.ingredients.values().cloned().collect())
    }

    async fn find_ingredient(&self, id: i64) -> Result<Option<Ingredient>, DatabaseError> {
        Ok(self.state.read().await.ingredients.get(&id).cloned())
    }

    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.ingredients.values().find(|i| i.name == name).cloned())
    }

    async fn insert_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient, DatabaseError> {
        let mut state = self.state.write().await;
        state.last_ingredient_id += 1;
        let created = ingredient.into_ingredient(state.last_ingredient_id, Utc::now());
        state.ingredients.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_ingredient(
        &self,
        id: i64,
        changes: IngredientChanges,
    ) -> Result<Option<Ingredient>, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state.ingredients.get_mut(&id).map(|stored| {
            stored.apply(changes, Utc::now());
            stored.clone()
        }))
    }

    async fn delete_ingredient(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        if state.ingredients.remove(&id).is_none() {
            return Ok(false);
        }
        state.pivots.retain(|(_, ingredient_id), _| *ingredient_id != id);
        Ok(true)
    }

    async fn list_cocktails(&self) -> Result<Vec<CocktailDetail>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.cocktails.values().map(|c| state.detail(c)).collect())
    }

    async fn find_cocktail(&self, id: i64) -> Result<Option<CocktailDetail>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.cocktails.get(&id).map(|c| state.detail(c)))
    }

    async fn find_cocktail_by_name(&self, name: &str) -> Result<Option<CocktailDetail>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.cocktails.values().find(|c| c.name == name).map(|c| state.detail(c)))
    }

    async fn insert_cocktail(&self, cocktail: NewCocktail) -> Result<CocktailDetail, DatabaseError> {
        let mut state = self.state.write().await;
        state.ensure_ingredients(&cocktail.ingredients)?;
        state.last_cocktail_id += 1;
        let now = Utc::now();
        let created = Cocktail {
            id: state.last_cocktail_id,
            name: cocktail.name,
            description: cocktail.description,
            created_at: now,
            updated_at: now,
        };
        state.cocktails.insert(created.id, created.clone());
        state.sync(created.id, &cocktail.ingredients);
        Ok(state.detail(&created))
    }

    async fn update_cocktail(
        &self,
        id: i64,
        changes: CocktailChanges,
    ) -> Result<Option<CocktailDetail>, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.cocktails.contains_key(&id) {
            return Ok(None);
        }
        if let Some(desired) = &changes.ingredients {
            state.ensure_ingredients(desired)?;
        }
        let Some(cocktail) = state.cocktails.get_mut(&id) else {
            return Ok(None);
        };
        cocktail.apply(&changes, Utc::now());
        let updated = cocktail.clone();

        if let Some(desired) = &changes.ingredients {
            state.sync(id, desired);
        }
        Ok(Some(state.detail(&updated)))
    }

    async fn delete_cocktail(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        if state.cocktails.remove(&id).is_none() {
            return Ok(false);
        }
        state.pivots.retain(|(cocktail_id, _), _| *cocktail_id != id);
        Ok(true)
    }

    async fn cocktails_with_ingredient(&self, ingredient_id: i64) -> Result<Vec<CocktailDetail>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .cocktails
            .values()
            .filter(|c| state.pivots.contains_key(&(c.id, ingredient_id)))
            .map(|c| state.detail(c))
            .collect())
    }
}
