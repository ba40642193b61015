pub mod account_service;
pub mod alcohol;
pub mod cocktail_service;
pub mod ingredient_service;
pub mod seed_service;

pub use account_service::{AccountService, Session};
pub use cocktail_service::CocktailService;
pub use ingredient_service::IngredientService;
pub use seed_service::{SeedReport, SeedService};
