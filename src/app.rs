use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::actor_middleware;
use crate::services::{AccountService, CocktailService, IngredientService, SeedService};

/// Shared handler state: the storage backend and the loaded configuration
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.store.clone(), self.config.security.clone())
    }

    pub fn ingredients(&self) -> IngredientService {
        IngredientService::new(self.store.clone())
    }

    pub fn cocktails(&self) -> CocktailService {
        CocktailService::new(self.store.clone())
    }

    pub fn seeder(&self) -> SeedService {
        SeedService::new(self.store.clone(), self.accounts())
    }
}

/// Full HTTP application
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Everything below resolves the caller first
        .merge(protected_routes(state.clone()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, cocktails, ingredients, search};

    Router::new()
        // Session
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::whoami))
        // Ingredients
        .route("/ingredients", get(ingredients::index).post(ingredients::store))
        .route(
            "/ingredients/:id",
            get(ingredients::show)
                .put(ingredients::update)
                .patch(ingredients::update)
                .delete(ingredients::destroy),
        )
        // Cocktails
        .route("/cocktails", get(cocktails::index).post(cocktails::store))
        .route(
            "/cocktails/:id",
            get(cocktails::show)
                .put(cocktails::update)
                .patch(cocktails::update)
                .delete(cocktails::destroy),
        )
        .route("/cocktails/:id/alcohol-content", get(cocktails::alcohol_content))
        .route("/cocktails/:id/alcohol", get(cocktails::alcohol_content))
        // Search
        .route("/search/:ingredient_id", get(search::by_ingredient))
        .route_layer(from_fn_with_state(state, actor_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}
