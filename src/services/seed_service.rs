use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::database::models::{Classification, CocktailChanges, Measure, NewCocktail, NewIngredient};
use crate::database::Store;
use crate::error::ApiError;
use crate::services::account_service::AccountService;
use crate::types::Role;

pub const ADMIN_NAME: &str = "Admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "password";

/// (name, type, origin, classification, alcohol_content)
const INGREDIENTS: &[(&str, &str, Option<&str>, Classification, f64)] = &[
    ("Vodka", "Smirnof", Some("Russia"), Classification::Alcoholic, 40.0),
    ("Gin", "Bombay Saphire", Some("UK"), Classification::Alcoholic, 40.0),
    ("Tequila", "Jose Cuervo", Some("Mexico"), Classification::Alcoholic, 38.0),
    ("Ron", "Barceló", Some("Caribbean"), Classification::Alcoholic, 40.0),
    ("Whiskey", "Chivas", Some("Scotland"), Classification::Alcoholic, 40.0),
    ("Triple Sec", "liqueur", Some("France"), Classification::Alcoholic, 30.0),
    ("Vermouth", "fortified wine", Some("Italy"), Classification::Alcoholic, 16.0),
    ("Lime Juice", "fruit", None, Classification::Juice, 0.0),
    ("Lemon Juice", "fruit", None, Classification::Juice, 0.0),
    ("Simple Syrup", "syrup", None, Classification::Garnish, 0.0),
    ("Soda Water", "soda", None, Classification::Soda, 0.0),
    ("Cola", "CocaCola", None, Classification::Soda, 0.0),
    ("Tonic Water", "Nordic Mist", None, Classification::Soda, 0.0),
    ("Mint Leaves", "herb", None, Classification::Garnish, 0.0),
];

/// Recipe name and (ingredient name, ml) rows
const RECIPES: &[(&str, &[(&str, f64)])] = &[
    ("Margarita", &[("Tequila", 50.0), ("Triple Sec", 20.0), ("Lime Juice", 30.0)]),
    (
        "Mojito",
        &[
            ("Rum", 50.0),
            ("Lime Juice", 25.0),
            ("Simple Syrup", 15.0),
            ("Soda Water", 60.0),
            ("Mint Leaves", 5.0),
        ],
    ),
    ("Old Fashioned", &[("Whiskey", 60.0), ("Simple Syrup", 10.0)]),
    ("Vodka Tonic", &[("Vodka", 50.0), ("Tonic Water", 120.0)]),
    ("Gin Tonic", &[("Gin", 50.0), ("Tonic Water", 120.0)]),
    ("Negroni", &[("Gin", 30.0), ("Vermouth", 30.0), ("Triple Sec", 10.0)]),
];

#[derive(Debug, Default, Clone, Serialize)]
pub struct SeedReport {
    pub admin_created: bool,
    pub ingredients_created: usize,
    pub cocktails_created: usize,
    pub cocktails_synced: usize,
    pub skipped_rows: usize,
}

/// Loads the demo data set. Everything is matched by name, so running it
/// twice leaves the store unchanged.
pub struct SeedService {
    store: Arc<dyn Store>,
    accounts: AccountService,
}

impl SeedService {
    pub fn new(store: Arc<dyn Store>, accounts: AccountService) -> Self {
        Self { store, accounts }
    }

    pub async fn run(&self) -> Result<SeedReport, ApiError> {
        let mut report = SeedReport::default();
        self.seed_admin(&mut report).await?;
        self.seed_ingredients(&mut report).await?;
        self.seed_cocktails(&mut report).await?;

        info!(
            "Seed complete: admin_created={}, ingredients={}, cocktails={} new / {} synced, skipped rows={}",
            report.admin_created,
            report.ingredients_created,
            report.cocktails_created,
            report.cocktails_synced,
            report.skipped_rows
        );
        Ok(report)
    }

    async fn seed_admin(&self, report: &mut SeedReport) -> Result<(), ApiError> {
        if self.store.find_user_by_email(ADMIN_EMAIL).await?.is_none() {
            self.accounts.create_user(ADMIN_NAME, ADMIN_EMAIL, ADMIN_PASSWORD, Role::Admin).await?;
            report.admin_created = true;
        }
        Ok(())
    }

    async fn seed_ingredients(&self, report: &mut SeedReport) -> Result<(), ApiError> {
        for (name, kind, origin, classification, abv) in INGREDIENTS {
            if self.store.find_ingredient_by_name(name).await?.is_some() {
                continue;
            }
            self.store
                .insert_ingredient(NewIngredient::new(
                    *name,
                    Some(kind.to_string()),
                    origin.map(str::to_string),
                    *classification,
                    Some(*abv),
                ))
                .await?;
            report.ingredients_created += 1;
        }
        Ok(())
    }

    async fn seed_cocktails(&self, report: &mut SeedReport) -> Result<(), ApiError> {
        for (cocktail_name, rows) in RECIPES {
            let mut measures = Vec::with_capacity(rows.len());
            for (ingredient_name, ml) in rows.iter() {
                match self.store.find_ingredient_by_name(ingredient_name).await? {
                    Some(ingredient) => measures.push(Measure {
                        ingredient_id: ingredient.id,
                        measure_ml: *ml,
                    }),
                    None => {
                        warn!("Seed recipe '{}' names unknown ingredient '{}'", cocktail_name, ingredient_name);
                        report.skipped_rows += 1;
                    }
                }
            }

            match self.store.find_cocktail_by_name(cocktail_name).await? {
                Some(existing) => {
                    let changes = CocktailChanges {
                        ingredients: Some(measures),
                        ..Default::default()
                    };
                    self.store.update_cocktail(existing.id(), changes).await?;
                    report.cocktails_synced += 1;
                }
                None => {
                    self.store
                        .insert_cocktail(NewCocktail {
                            name: cocktail_name.to_string(),
                            description: None,
                            ingredients: measures,
                        })
                        .await?;
                    report.cocktails_created += 1;
                }
            }
            debug!("Seeded cocktail '{}'", cocktail_name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;

    fn seeder(store: Arc<MemoryStore>) -> SeedService {
        let config = AppConfig::in_memory("seed-secret");
        SeedService::new(store.clone(), AccountService::new(store, config.security))
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let seeder = seeder(store.clone());

        let first = seeder.run().await.unwrap();
        assert!(first.admin_created);
        assert_eq!(first.ingredients_created, 14);
        assert_eq!(first.cocktails_created, 6);
        assert_eq!(first.skipped_rows, 1);

        let second = seeder.run().await.unwrap();
        assert!(!second.admin_created);
        assert_eq!(second.ingredients_created, 0);
        assert_eq!(second.cocktails_created, 0);
        assert_eq!(second.cocktails_synced, 6);

        assert_eq!(store.list_ingredients().await.unwrap().len(), 14);
        assert_eq!(store.list_cocktails().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn seeded_margarita_strength() {
        let store = Arc::new(MemoryStore::new());
        seeder(store.clone()).run().await.unwrap();

        // (50*38 + 20*30) / 100 ml over 100 ml
        let margarita = store.find_cocktail_by_name("Margarita").await.unwrap().unwrap();
        assert_eq!(margarita.alcohol_content(), 25.0);

        let mojito = store.find_cocktail_by_name("Mojito").await.unwrap().unwrap();
        assert_eq!(mojito.ingredients.len(), 4);
        assert_eq!(mojito.alcohol_content(), 0.0);
    }
}
