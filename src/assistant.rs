//! The answer service: the contract consumed by the CLI tools and the
//! HTTP surface.

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use serde::Serialize;

use crate::errors::AppError;
use crate::llm::ChatModel;
use crate::prompt::assemble;
use crate::retrieval::{retrieve, Retrieved};
use crate::store::{CollectionKind, StoreQuery, VectorCollection};

/// Question asked of the model when the user supplies an image instead of
/// text.
const IMAGE_QUERY_QUESTION: &str =
    "Describe the products most similar to the uploaded image.";

/// The response contract: the synthesized answer plus the evidence that
/// grounded it. Rebuilt per query; nothing is cached between calls.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerEnvelope {
    pub answer: String,
    pub texts: Vec<Retrieved>,
    pub images: Vec<Retrieved>,
}

/// Explicitly constructed context for answering queries: both collection
/// handles and the chat model, opened once at process start and shared.
/// Each call runs its retrieve → assemble → complete sequence end-to-end;
/// no session state is retained between calls.
pub struct Assistant {
    text_collection: Arc<dyn VectorCollection>,
    image_collection: Arc<dyn VectorCollection>,
    model: Arc<dyn ChatModel>,
    max_results: usize,
    temperature: f64,
}

impl Assistant {
    pub fn new(
        text_collection: Arc<dyn VectorCollection>,
        image_collection: Arc<dyn VectorCollection>,
        model: Arc<dyn ChatModel>,
        max_results: usize,
        temperature: f64,
    ) -> Self {
        Self {
            text_collection,
            image_collection,
            model,
            max_results,
            temperature,
        }
    }

    /// Answer a natural-language question. Both collections are queried
    /// independently; their results are never fused numerically, the
    /// prompt instructions arbitrate instead.
    pub async fn answer(&self, query: &str) -> Result<AnswerEnvelope, AppError> {
        let store_query = StoreQuery::Text(query.to_string());
        let texts = retrieve(
            self.text_collection.as_ref(),
            CollectionKind::Text,
            &store_query,
            self.max_results,
        )
        .await?;
        let images = retrieve(
            self.image_collection.as_ref(),
            CollectionKind::Image,
            &store_query,
            self.max_results,
        )
        .await?;

        let inputs = assemble(query, &texts, &images)?;
        let request = inputs.to_request().with_temperature(self.temperature);
        let answer = self.model.complete(request).await?;

        tracing::info!(
            "Answered query with {} text and {} image results",
            texts.len(),
            images.len()
        );

        Ok(AnswerEnvelope {
            answer,
            texts,
            images,
        })
    }

    /// Answer from an uploaded image: only the image collection is
    /// queried, and the text evidence stays empty.
    pub async fn answer_by_image(&self, image_path: &Path) -> Result<AnswerEnvelope, AppError> {
        let bytes = std::fs::read(image_path).map_err(|source| AppError::ImageRead {
            path: image_path.to_path_buf(),
            source,
        })?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        let images = retrieve(
            self.image_collection.as_ref(),
            CollectionKind::Image,
            &StoreQuery::ImageBase64(encoded),
            self.max_results,
        )
        .await?;

        let inputs = assemble(IMAGE_QUERY_QUESTION, &[], &images)?;
        let request = inputs.to_request().with_temperature(self.temperature);
        let answer = self.model.complete(request).await?;

        tracing::info!("Answered image query with {} image results", images.len());

        Ok(AnswerEnvelope {
            answer,
            texts: Vec::new(),
            images,
        })
    }
}
