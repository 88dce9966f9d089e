use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all carchain endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/add_car_data", post(handler::add_car_data))
        .route("/get_car_history/:car_id", get(handler::get_car_history))
        .route("/validate_chain", get(handler::validate_chain))
        .route("/status", get(handler::status))
        .route("/blocks", get(handler::blocks))
        .route("/health", get(handler::health))
        .route("/info", get(handler::info))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
