use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};

/// Builds the application router with its middleware stack.
pub fn app_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    let form_routes = Router::new()
        .route("/", get(handlers::index))
        .route(
            "/get_districts_and_regions",
            post(handlers::get_districts_and_regions),
        )
        .route("/predict", post(handlers::predict))
        // JSON API
        .route("/api/v1/options", get(handlers::options))
        .route("/api/v1/predict", post(handlers::predict_api))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(body_limit)));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(form_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
