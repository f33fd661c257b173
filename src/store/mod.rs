//! Vector collection abstraction over the external embedding store.
//!
//! Two named collections share one identifier space: one indexes product
//! text summaries, the other indexes product images by locator. Embedding
//! happens inside the store service; this side only ships content.

mod chroma;
mod memory;

pub use chroma::ChromaCollection;
pub use memory::MemoryCollection;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Which of the two collections a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Text,
    Image,
}

/// Embedding-ready content for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreContent {
    /// Text to embed directly.
    Document(String),
    /// Locator of an image file the store embeds from disk.
    ImageUri(String),
}

impl StoreContent {
    pub fn as_str(&self) -> &str {
        match self {
            StoreContent::Document(text) => text,
            StoreContent::ImageUri(uri) => uri,
        }
    }
}

/// One record as held inside a collection. Identifiers are unique within a
/// collection; the same id may exist in both collections with consistent
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: String,
    pub content: StoreContent,
    pub metadata: Value,
}

/// A query against a collection: either text or a base64-encoded image.
#[derive(Debug, Clone)]
pub enum StoreQuery {
    Text(String),
    ImageBase64(String),
}

/// One ranked hit from a collection query. `document` is set for text
/// collections, `uri` for image collections; lower `distance` is closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHit {
    pub id: String,
    pub document: Option<String>,
    pub uri: Option<String>,
    pub metadata: Value,
    pub distance: f32,
}

/// One of the two collections of the embedding store.
///
/// The query interface is batch-oriented on the wire and exposes no has-id
/// primitive; existing-identifier discovery goes through [`list_ids`],
/// a full enumeration.
///
/// [`list_ids`]: VectorCollection::list_ids
#[async_trait]
pub trait VectorCollection: Send + Sync {
    /// The collection name.
    fn name(&self) -> &str;

    /// Number of records currently held.
    async fn count(&self) -> Result<usize, AppError>;

    /// All identifiers currently held (full scan).
    async fn list_ids(&self) -> Result<Vec<String>, AppError>;

    /// Add records. Callers must not resubmit identifiers already held.
    async fn add(&self, records: &[StoreRecord]) -> Result<(), AppError>;

    /// Nearest neighbors for the query, closest first, at most
    /// `max_results` entries.
    async fn query(
        &self,
        query: &StoreQuery,
        max_results: usize,
    ) -> Result<Vec<StoreHit>, AppError>;
}
