use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health};
use crate::state::AppState;

/// The application router: health and status probes plus the two chat
/// endpoints the front-end talks to.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/status", get(health::status))
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/image", post(chat::chat_image))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}
