//! In-memory collection backend.
//!
//! Brute-force lexical scoring instead of learned embeddings: good enough
//! to exercise the ingestion and retrieval pipeline offline and under
//! test, without the store server. Not meant for production ranking.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::AppError;
use super::{StoreContent, StoreHit, StoreQuery, StoreRecord, VectorCollection};

pub struct MemoryCollection {
    name: String,
    records: RwLock<Vec<StoreRecord>>,
}

impl MemoryCollection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Text a record is matched against: document content plus the product
    /// name and locator from its metadata.
    fn searchable_text(record: &StoreRecord) -> String {
        let mut text = record.content.as_str().to_string();
        if let Some(name) = record.metadata.get("name").and_then(|v| v.as_str()) {
            text.push(' ');
            text.push_str(name);
        }
        text.to_lowercase()
    }

    /// Term-overlap distance in [0, 1]; 0 means every query term matched.
    fn distance(query: &str, haystack: &str) -> f32 {
        let terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return 1.0;
        }
        let matched = terms
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .count();
        1.0 - matched as f32 / terms.len() as f32
    }
}

#[async_trait]
impl VectorCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<usize, AppError> {
        Ok(self.records.read().await.len())
    }

    async fn list_ids(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .map(|r| r.id.clone())
            .collect())
    }

    async fn add(&self, records: &[StoreRecord]) -> Result<(), AppError> {
        self.records.write().await.extend_from_slice(records);
        Ok(())
    }

    async fn query(
        &self,
        query: &StoreQuery,
        max_results: usize,
    ) -> Result<Vec<StoreHit>, AppError> {
        let records = self.records.read().await;

        let mut scored: Vec<(f32, &StoreRecord)> = match query {
            StoreQuery::Text(text) => {
                let needle = text.to_lowercase();
                records
                    .iter()
                    .map(|r| (Self::distance(&needle, &Self::searchable_text(r)), r))
                    .collect()
            }
            // No local image embedding; insertion order stands in for
            // similarity so image flows stay exercisable offline.
            StoreQuery::ImageBase64(_) => records
                .iter()
                .enumerate()
                .map(|(i, r)| (i as f32, r))
                .collect(),
        };

        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(max_results);

        Ok(scored
            .into_iter()
            .map(|(distance, record)| {
                let (document, uri) = match &record.content {
                    StoreContent::Document(text) => (Some(text.clone()), None),
                    StoreContent::ImageUri(uri) => (None, Some(uri.clone())),
                };
                StoreHit {
                    id: record.id.clone(),
                    document,
                    uri,
                    metadata: record.metadata.clone(),
                    distance,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn text_record(id: &str, content: &str, name: &str) -> StoreRecord {
        StoreRecord {
            id: id.to_string(),
            content: StoreContent::Document(content.to_string()),
            metadata: json!({ "product_id": id, "name": name }),
        }
    }

    #[tokio::test]
    async fn ranks_by_term_overlap() {
        let collection = MemoryCollection::new("test");
        collection
            .add(&[
                text_record("1", "Product: Desk Lamp\nCategory: Lighting", "Desk Lamp"),
                text_record("2", "Product: Smartphone X\nCategory: Phones", "Smartphone X"),
            ])
            .await
            .unwrap();

        let hits = collection
            .query(&StoreQuery::Text("smartphone".to_string()), 5)
            .await
            .unwrap();
        assert_eq!(hits[0].id, "2");
        assert!(hits[0].distance < hits[1].distance);
    }

    #[tokio::test]
    async fn respects_max_results() {
        let collection = MemoryCollection::new("test");
        for i in 0..10 {
            collection
                .add(&[text_record(&i.to_string(), "Product: Widget", "Widget")])
                .await
                .unwrap();
        }

        let hits = collection
            .query(&StoreQuery::Text("widget".to_string()), 3)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(collection.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn image_records_expose_uri_as_hit_uri() {
        let collection = MemoryCollection::new("images");
        collection
            .add(&[StoreRecord {
                id: "7".to_string(),
                content: StoreContent::ImageUri("/images/7.jpg".to_string()),
                metadata: json!({ "product_id": "7" }),
            }])
            .await
            .unwrap();

        let hits = collection
            .query(&StoreQuery::ImageBase64("aGVsbG8=".to_string()), 2)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uri.as_deref(), Some("/images/7.jpg"));
        assert!(hits[0].document.is_none());
    }
}
