//! Retrieval and result normalization.
//!
//! Text hits and image hits come back in different shapes (stored document
//! text vs image locator); both are normalized into [`Retrieved`] so the
//! prompt assembler and the HTTP surface handle one shape. The store's own
//! ranking is trusted as the relevance contract; nothing re-ranks here,
//! and combined queries never fuse the two collections' scores.

use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::store::{CollectionKind, StoreHit, StoreQuery, VectorCollection};

/// One retrieved evidence entry: content (document text or image locator),
/// the shared metadata record, the image locator, and the store distance.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieved {
    pub content: String,
    pub metadata: Value,
    pub uri: String,
    pub distance: f32,
}

fn normalize(kind: CollectionKind, hit: StoreHit) -> Retrieved {
    match kind {
        CollectionKind::Text => {
            let uri = hit
                .metadata
                .get("uri")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Retrieved {
                content: hit.document.unwrap_or_default(),
                metadata: hit.metadata,
                uri,
                distance: hit.distance,
            }
        }
        CollectionKind::Image => {
            // For already-ingested images the store returns locators, not
            // pixels; the locator is the content.
            let uri = hit.uri.unwrap_or_default();
            Retrieved {
                content: uri.clone(),
                metadata: hit.metadata,
                uri,
                distance: hit.distance,
            }
        }
    }
}

/// Query one collection and normalize its hits, preserving store order.
pub async fn retrieve(
    collection: &dyn VectorCollection,
    kind: CollectionKind,
    query: &StoreQuery,
    max_results: usize,
) -> Result<Vec<Retrieved>, AppError> {
    let hits = collection.query(query, max_results).await?;
    Ok(hits.into_iter().map(|hit| normalize(kind, hit)).collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::store::{MemoryCollection, StoreContent, StoreRecord};
    use super::*;

    #[tokio::test]
    async fn text_hits_carry_document_content_and_metadata_uri() {
        let collection = MemoryCollection::new("text");
        collection
            .add(&[StoreRecord {
                id: "42".to_string(),
                content: StoreContent::Document(
                    "Product: Smartphone X\nCategory: Phones".to_string(),
                ),
                metadata: json!({
                    "product_id": "42",
                    "name": "Smartphone X",
                    "uri": "/images/42.jpg",
                }),
            }])
            .await
            .unwrap();

        let results = retrieve(
            &collection,
            CollectionKind::Text,
            &StoreQuery::Text("smartphone".to_string()),
            5,
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("Smartphone X"));
        assert_eq!(results[0].uri, "/images/42.jpg");
        assert_eq!(results[0].metadata["product_id"], "42");
    }

    #[tokio::test]
    async fn image_hits_use_the_locator_as_content() {
        let collection = MemoryCollection::new("image");
        collection
            .add(&[StoreRecord {
                id: "42".to_string(),
                content: StoreContent::ImageUri("/images/42.jpg".to_string()),
                metadata: json!({ "product_id": "42" }),
            }])
            .await
            .unwrap();

        let results = retrieve(
            &collection,
            CollectionKind::Image,
            &StoreQuery::Text("anything".to_string()),
            5,
        )
        .await
        .unwrap();

        assert_eq!(results[0].content, "/images/42.jpg");
        assert_eq!(results[0].uri, "/images/42.jpg");
    }

    #[tokio::test]
    async fn results_are_capped_and_ordered() {
        let collection = MemoryCollection::new("text");
        let records: Vec<StoreRecord> = (0..8)
            .map(|i| StoreRecord {
                id: i.to_string(),
                content: StoreContent::Document(if i == 3 {
                    "Product: Smartphone".to_string()
                } else {
                    "Product: Toaster".to_string()
                }),
                metadata: json!({ "product_id": i.to_string(), "uri": format!("/{i}.jpg") }),
            })
            .collect();
        collection.add(&records).await.unwrap();

        let results = retrieve(
            &collection,
            CollectionKind::Text,
            &StoreQuery::Text("smartphone".to_string()),
            5,
        )
        .await
        .unwrap();

        assert!(results.len() <= 5);
        assert_eq!(results[0].metadata["product_id"], "3");
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }
}
