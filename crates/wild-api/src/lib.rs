//! # wild-api
//!
//! REST API layer for Wildthoughts: the animal catalogue, discussions,
//! petitions, user lists, votes, search and profiles, plus authentication.

pub mod auth;
pub mod middleware;
pub mod routes;

use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;
use tower_http::services::ServeDir;
use wild_db::{
    Database,
    storage::{MEDIA_URL, MediaStore},
};

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Where uploaded pictures are written; also served under `/media`.
    pub storage: MediaStore,
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = wild_common::config::get().storage.max_upload_bytes;

    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::health::router())
        .merge(routes::home::router())
        .merge(routes::votes::router())
        .merge(routes::animals::router())
        .merge(routes::discussions::router())
        .merge(routes::lists::router())
        .merge(routes::petitions::router())
        .merge(routes::profiles::router())
        .merge(routes::uploads::router());

    let media = ServeDir::new(state.storage.root());

    Router::new()
        .nest("/api/v1", api_routes)
        .nest_service(MEDIA_URL, media)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}
