use crate::api::{handlers, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Participant directory
        .route(
            "/v1/tenants/:tenant_id/participants",
            post(handlers::register_participant).get(handlers::list_participants),
        )
        .route(
            "/v1/tenants/:tenant_id/search",
            get(handlers::search_participants),
        )
        .route(
            "/v1/tenants/:tenant_id/participants/:id",
            get(handlers::get_participant),
        )
        .route(
            "/v1/tenants/:tenant_id/participants/:id/status",
            post(handlers::change_status),
        )
        .route(
            "/v1/tenants/:tenant_id/participants/:id/tags",
            put(handlers::update_tags),
        )
        // Business categories
        .route(
            "/v1/categories",
            post(handlers::register_category).get(handlers::list_categories),
        )
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
