use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    plan_sync, AccessToken, Classification, Cocktail, CocktailChanges, CocktailDetail, CocktailIngredient,
    Ingredient, IngredientChanges, Measure, NewCocktail, NewIngredient, NewUser, Pivot, User,
};
use crate::database::store::Store;
use crate::types::{Role, Scope};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";
const INGREDIENT_COLUMNS: &str = "id, name, type, origin, classification, alcohol_content, created_at, updated_at";
const COCKTAIL_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Attach ingredients (with pivots) to the given cocktails, preserving order
    async fn load_details(&self, cocktails: Vec<Cocktail>) -> Result<Vec<CocktailDetail>, DatabaseError> {
        if cocktails.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i64> = cocktails.iter().map(|c| c.id).collect();

        let rows = sqlx::query(
            r#"
            SELECT
                ci.cocktail_id, ci.ingredient_id, ci.measure_ml,
                ci.created_at AS pivot_created_at, ci.updated_at AS pivot_updated_at,
                i.id, i.name, i.type, i.origin, i.classification, i.alcohol_content,
                i.created_at, i.updated_at
            FROM cocktail_ingredient ci
            JOIN ingredients i ON i.id = ci.ingredient_id
            WHERE ci.cocktail_id = ANY($1)
            ORDER BY ci.cocktail_id, ci.ingredient_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_cocktail: HashMap<i64, Vec<CocktailIngredient>> = HashMap::new();
        for row in &rows {
            let pivot = Pivot {
                cocktail_id: row.try_get("cocktail_id")?,
                ingredient_id: row.try_get("ingredient_id")?,
                measure_ml: row.try_get("measure_ml")?,
                created_at: row.try_get("pivot_created_at")?,
                updated_at: row.try_get("pivot_updated_at")?,
            };
            by_cocktail.entry(pivot.cocktail_id).or_default().push(CocktailIngredient {
                ingredient: ingredient_from_row(row)?,
                pivot,
            });
        }

        Ok(cocktails
            .into_iter()
            .map(|cocktail| CocktailDetail {
                ingredients: by_cocktail.remove(&cocktail.id).unwrap_or_default(),
                cocktail,
            })
            .collect())
    }

    async fn load_detail(&self, cocktail: Option<Cocktail>) -> Result<Option<CocktailDetail>, DatabaseError> {
        match cocktail {
            Some(cocktail) => Ok(self.load_details(vec![cocktail]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Diff the stored associations against `desired`, then delete and upsert
    /// inside the caller's transaction.
    async fn sync_ingredients(
        tx: &mut Transaction<'_, Postgres>,
        cocktail_id: i64,
        desired: &[Measure],
    ) -> Result<(), DatabaseError> {
        // FOR SHARE holds off concurrent ingredient deletes until commit
        let requested: Vec<i64> = desired.iter().map(|m| m.ingredient_id).collect();
        if !requested.is_empty() {
            let found = sqlx::query("SELECT id FROM ingredients WHERE id = ANY($1) FOR SHARE")
                .bind(&requested)
                .fetch_all(&mut **tx)
                .await?
                .iter()
                .map(|row| row.try_get::<i64, _>("id"))
                .collect::<Result<Vec<i64>, sqlx::Error>>()?;
            let missing: Vec<i64> = requested.into_iter().filter(|id| !found.contains(id)).collect();
            if !missing.is_empty() {
                return Err(DatabaseError::MissingIngredients(missing));
            }
        }

        let current = sqlx::query(
            "SELECT ingredient_id, measure_ml FROM cocktail_ingredient WHERE cocktail_id = $1 FOR UPDATE",
        )
        .bind(cocktail_id)
        .fetch_all(&mut **tx)
        .await?
        .iter()
        .map(|row| {
            Ok(Measure {
                ingredient_id: row.try_get("ingredient_id")?,
                measure_ml: row.try_get("measure_ml")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let plan = plan_sync(&current, desired);
        if plan.is_empty() {
            return Ok(());
        }

        if !plan.detach.is_empty() {
            sqlx::query("DELETE FROM cocktail_ingredient WHERE cocktail_id = $1 AND ingredient_id = ANY($2)")
                .bind(cocktail_id)
                .bind(&plan.detach)
                .execute(&mut **tx)
                .await?;
        }

        for measure in plan.upserts() {
            sqlx::query(
                r#"
                INSERT INTO cocktail_ingredient (cocktail_id, ingredient_id, measure_ml, created_at, updated_at)
                VALUES ($1, $2, $3, now(), now())
                ON CONFLICT (cocktail_id, ingredient_id)
                DO UPDATE SET measure_ml = EXCLUDED.measure_ml, updated_at = now()
                "#,
            )
            .bind(cocktail_id)
            .bind(measure.ingredient_id)
            .bind(measure.measure_ml)
            .execute(&mut **tx)
            .await?;
        }

        tracing::debug!(
            "Synced cocktail {}: {} detached, {} attached, {} updated",
            cocktail_id,
            plan.detach.len(),
            plan.attach.len(),
            plan.update.len()
        );
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<User, DatabaseError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse::<Role>().map_err(DatabaseError::Corrupt)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn token_from_row(row: &PgRow) -> Result<AccessToken, DatabaseError> {
    let scopes: Vec<String> = row.try_get("scopes")?;
    Ok(AccessToken {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        scopes: scopes
            .iter()
            .map(|s| s.parse::<Scope>())
            .collect::<Result<_, _>>()
            .map_err(DatabaseError::Corrupt)?,
        revoked: row.try_get("revoked")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}

fn ingredient_from_row(row: &PgRow) -> Result<Ingredient, DatabaseError> {
    let classification: String = row.try_get("classification")?;
    Ok(Ingredient {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: row.try_get("type")?,
        origin: row.try_get("origin")?,
        classification: classification.parse::<Classification>().map_err(DatabaseError::Corrupt)?,
        alcohol_content: row.try_get("alcohol_content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn cocktail_from_row(row: &PgRow) -> Result<Cocktail, DatabaseError> {
    Ok(Cocktail {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let result = sqlx::query(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => user_from_row(&row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(DatabaseError::Conflict {
                field: "email",
                message: "The email has already been taken.".to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&sql).bind(email).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_token(&self, token: &AccessToken) -> Result<(), DatabaseError> {
        let scopes: Vec<&str> = token.scopes.iter().map(|s| s.as_str()).collect();
        sqlx::query(
            "INSERT INTO access_tokens (id, user_id, scopes, revoked, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&scopes)
        .bind(token.revoked)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_token(&self, id: Uuid) -> Result<Option<AccessToken>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, user_id, scopes, revoked, created_at, expires_at FROM access_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(token_from_row).transpose()
    }

    async fn revoke_token(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE access_tokens SET revoked = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_inactive_tokens(&self, user_id: Option<i64>, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM access_tokens
             WHERE (revoked OR expires_at <= $1) AND ($2::BIGINT IS NULL OR user_id = $2)",
        )
        .bind(now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DatabaseError> {
        let sql = format!("SELECT {} FROM ingredients ORDER BY id", INGREDIENT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(ingredient_from_row).collect()
    }

    async fn find_ingredient(&self, id: i64) -> Result<Option<Ingredient>, DatabaseError> {
        let sql = format!("SELECT {} FROM ingredients WHERE id = $1", INGREDIENT_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(ingredient_from_row).transpose()
    }

    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>, DatabaseError> {
        let sql = format!("SELECT {} FROM ingredients WHERE name = $1 ORDER BY id LIMIT 1", INGREDIENT_COLUMNS);
        let row = sqlx::query(&sql).bind(name).fetch_optional(&self.pool).await?;
        row.as_ref().map(ingredient_from_row).transpose()
    }

    async fn insert_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient, DatabaseError> {
        let sql = format!(
            "INSERT INTO ingredients (name, type, origin, classification, alcohol_content)
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            INGREDIENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&ingredient.name)
            .bind(&ingredient.kind)
            .bind(&ingredient.origin)
            .bind(ingredient.classification.as_str())
            .bind(ingredient.alcohol_content)
            .fetch_one(&self.pool)
            .await?;
        ingredient_from_row(&row)
    }

    async fn update_ingredient(
        &self,
        id: i64,
        changes: IngredientChanges,
    ) -> Result<Option<Ingredient>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM ingredients WHERE id = $1 FOR UPDATE", INGREDIENT_COLUMNS);
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };
        let mut ingredient = ingredient_from_row(&row)?;
        ingredient.apply(changes, Utc::now());

        sqlx::query(
            "UPDATE ingredients
             SET name = $2, type = $3, origin = $4, classification = $5, alcohol_content = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(ingredient.id)
        .bind(&ingredient.name)
        .bind(&ingredient.kind)
        .bind(&ingredient.origin)
        .bind(ingredient.classification.as_str())
        .bind(ingredient.alcohol_content)
        .bind(ingredient.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Some(ingredient))
    }

    async fn delete_ingredient(&self, id: i64) -> Result<bool, DatabaseError> {
        // cocktail_ingredient rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_cocktails(&self) -> Result<Vec<CocktailDetail>, DatabaseError> {
        let sql = format!("SELECT {} FROM cocktails ORDER BY id", COCKTAIL_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let cocktails = rows.iter().map(cocktail_from_row).collect::<Result<Vec<_>, _>>()?;
        self.load_details(cocktails).await
    }

    async fn find_cocktail(&self, id: i64) -> Result<Option<CocktailDetail>, DatabaseError> {
        let sql = format!("SELECT {} FROM cocktails WHERE id = $1", COCKTAIL_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        let cocktail = row.as_ref().map(cocktail_from_row).transpose()?;
        self.load_detail(cocktail).await
    }

    async fn find_cocktail_by_name(&self, name: &str) -> Result<Option<CocktailDetail>, DatabaseError> {
        let sql = format!("SELECT {} FROM cocktails WHERE name = $1 ORDER BY id LIMIT 1", COCKTAIL_COLUMNS);
        let row = sqlx::query(&sql).bind(name).fetch_optional(&self.pool).await?;
        let cocktail = row.as_ref().map(cocktail_from_row).transpose()?;
        self.load_detail(cocktail).await
    }

    async fn insert_cocktail(&self, cocktail: NewCocktail) -> Result<CocktailDetail, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO cocktails (name, description) VALUES ($1, $2) RETURNING {}",
            COCKTAIL_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&cocktail.name)
            .bind(&cocktail.description)
            .fetch_one(&mut *tx)
            .await?;
        let created = cocktail_from_row(&row)?;

        Self::sync_ingredients(&mut tx, created.id, &cocktail.ingredients).await?;
        tx.commit().await?;

        let id = created.id;
        self.load_detail(Some(created))
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("cocktail {} vanished after insert", id)))
    }

    async fn update_cocktail(
        &self,
        id: i64,
        changes: CocktailChanges,
    ) -> Result<Option<CocktailDetail>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM cocktails WHERE id = $1 FOR UPDATE", COCKTAIL_COLUMNS);
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };
        let mut cocktail = cocktail_from_row(&row)?;
        cocktail.apply(&changes, Utc::now());

        sqlx::query("UPDATE cocktails SET name = $2, description = $3, updated_at = $4 WHERE id = $1")
            .bind(id)
            .bind(&cocktail.name)
            .bind(&cocktail.description)
            .bind(cocktail.updated_at)
            .execute(&mut *tx)
            .await?;

        if let Some(desired) = &changes.ingredients {
            Self::sync_ingredients(&mut tx, id, desired).await?;
        }
        tx.commit().await?;

        self.load_detail(Some(cocktail)).await
    }

    async fn delete_cocktail(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM cocktails WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cocktails_with_ingredient(&self, ingredient_id: i64) -> Result<Vec<CocktailDetail>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM cocktails c
             WHERE EXISTS (
                 SELECT 1 FROM cocktail_ingredient ci
                 WHERE ci.cocktail_id = c.id AND ci.ingredient_id = $1
             )
             ORDER BY c.id",
            COCKTAIL_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(ingredient_id).fetch_all(&self.pool).await?;
        let cocktails = rows.iter().map(cocktail_from_row).collect::<Result<Vec<_>, _>>()?;
        self.load_details(cocktails).await
    }
}
