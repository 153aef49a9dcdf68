use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::cache::PriceCache;
use crate::config::AppConfig;
use crate::plugins::PluginManager;

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use handlers::{health_check, liveness, start_scrape};
pub use responses::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<dyn PriceCache>,
    pub plugins: PluginManager,
}

impl AppState {
    pub fn new(config: AppConfig, cache: Arc<dyn PriceCache>, plugins: PluginManager) -> Self {
        Self {
            config: Arc::new(config),
            cache,
            plugins,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
        .merge(scrape_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(from_fn(middleware::request_logging))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn scrape_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/scrape/", post(start_scrape))
        .route("/scrape", post(start_scrape))
        .route_layer(from_fn_with_state(state, middleware::require_bearer))
}
