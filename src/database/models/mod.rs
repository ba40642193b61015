pub mod cocktail;
pub mod ingredient;
pub mod token;
pub mod user;

pub use cocktail::{
    plan_sync, Cocktail, CocktailChanges, CocktailDetail, CocktailIngredient, Measure, NewCocktail, Pivot,
    SyncPlan,
};
pub use ingredient::{Classification, Ingredient, IngredientChanges, NewIngredient};
pub use token::AccessToken;
pub use user::{NewUser, User};
