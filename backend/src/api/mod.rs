//! API module
//!
//! Contains HTTP request handlers and the router that wires them together.

pub mod chats;
pub mod companies;
pub mod health;
pub mod middleware;

use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route("/chats", get(chats::get_chat).post(chats::upsert_chat))
        .route("/chats/list", get(chats::list_chats))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
