//! Shared application state and construction of the answer pipeline.

use std::sync::Arc;

use crate::assistant::Assistant;
use crate::config::{AppConfig, AppPaths};
use crate::errors::AppError;
use crate::llm::{ChatModel, OpenAiChat};
use crate::store::{ChromaCollection, VectorCollection};

/// Open both collections against the configured store server.
pub async fn open_collections(
    config: &AppConfig,
) -> Result<(Arc<dyn VectorCollection>, Arc<dyn VectorCollection>), AppError> {
    let text: Arc<dyn VectorCollection> = Arc::new(
        ChromaCollection::open(&config.store.base_url, &config.store.text_collection).await?,
    );
    let image: Arc<dyn VectorCollection> = Arc::new(
        ChromaCollection::open(&config.store.base_url, &config.store.image_collection).await?,
    );
    Ok((text, image))
}

/// Build a standalone [`Assistant`] for the one-shot CLI tools.
pub async fn build_assistant(config: &AppConfig) -> Result<Assistant, AppError> {
    let api_key = config.api_key()?;
    let (text_collection, image_collection) = open_collections(config).await?;
    let model: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(&config.model, api_key));
    Ok(Assistant::new(
        text_collection,
        image_collection,
        model,
        config.max_results,
        config.model.temperature,
    ))
}

/// State shared by all HTTP handlers. Store handles are opened once here
/// and reused for every request.
pub struct AppState {
    pub paths: AppPaths,
    pub config: AppConfig,
    pub text_collection: Arc<dyn VectorCollection>,
    pub image_collection: Arc<dyn VectorCollection>,
    pub assistant: Assistant,
}

impl AppState {
    pub async fn initialize(paths: AppPaths) -> Result<Arc<Self>, AppError> {
        let config = AppConfig::load(&paths)?;
        let api_key = config.api_key()?;

        let (text_collection, image_collection) = open_collections(&config).await?;
        let model: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(&config.model, api_key));
        let assistant = Assistant::new(
            text_collection.clone(),
            image_collection.clone(),
            model,
            config.max_results,
            config.model.temperature,
        );

        Ok(Arc::new(Self {
            paths,
            config,
            text_collection,
            image_collection,
            assistant,
        }))
    }
}
