//! Route table and middleware

use super::handlers;
use super::state::AppState;
use crate::core::locale_script;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Builds the application router
///
/// API routes come first; anything else is looked up in `static_dir`, and a
/// miss there is answered with the JSON 404 envelope.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let static_files =
        ServeDir::new(static_dir).not_found_service(handlers::not_found.into_service());

    Router::new()
        .route("/api/validate-key", post(handlers::validate_key))
        .route("/api/test-connection", post(handlers::test_connection))
        .route("/api/import-patients", post(handlers::import_patients))
        .route("/api/create-employee", post(handlers::create_employee))
        .route("/api/create-account", post(handlers::create_account))
        .route("/api/execute-sql", post(handlers::execute_sql))
        .route("/api/health", get(handlers::health))
        .route(
            &format!("/api/downloads/{}", locale_script::FILE_NAME),
            get(handlers::download_locale_script),
        )
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
