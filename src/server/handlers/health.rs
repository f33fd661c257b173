use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Collection sizes and the configured model, for the front-end status
/// panel.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let text_count = state.text_collection.count().await?;
    let image_count = state.image_collection.count().await?;

    Ok(Json(json!({
        "text_collection": {
            "name": state.text_collection.name(),
            "count": text_count,
        },
        "image_collection": {
            "name": state.image_collection.name(),
            "count": image_count,
        },
        "model": state.config.model.model,
    })))
}
