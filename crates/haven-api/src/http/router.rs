//! Axum router configuration with middleware.
//!
//! REST routes live under `/api/v1/`; the signaling WebSocket is at
//! `/ws`. Middleware: CORS and request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::{handlers, ws};
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/channels/{id}/video/session",
            post(handlers::video::create_session),
        )
        .route(
            "/channels/{id}/video/token",
            post(handlers::video::create_token),
        )
        .route(
            "/counselors/{id}/archives",
            get(handlers::archive::list_archives),
        )
        .route(
            "/counselors/{id}/summaries",
            get(handlers::archive::list_summaries),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
