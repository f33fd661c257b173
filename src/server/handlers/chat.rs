use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::Deserialize;
use uuid::Uuid;

use crate::assistant::AnswerEnvelope;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> Result<Json<AnswerEnvelope>, AppError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    state.assistant.answer(message).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct ImageChatBody {
    pub image_base64: String,
}

/// Image query: the upload is persisted under the user-uploads directory
/// first, then the stored file drives the retrieval.
pub async fn chat_image(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImageChatBody>,
) -> Result<Json<AnswerEnvelope>, AppError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(body.image_base64.trim())
        .map_err(|e| AppError::BadRequest(format!("invalid base64 image: {e}")))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("image payload is empty".to_string()));
    }

    let path = state.paths.upload_dir.join(format!("{}.jpg", Uuid::new_v4()));
    std::fs::write(&path, &bytes).map_err(AppError::internal)?;
    tracing::info!("Stored uploaded query image at {}", path.display());

    state.assistant.answer_by_image(&path).await.map(Json)
}
