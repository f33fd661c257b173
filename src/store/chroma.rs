//! HTTP client for a Chroma-style embedding store server.
//!
//! The server owns the embedding functions for both collections; this
//! client only ships ids, content (documents or image locators), and
//! metadata, and reads back ranked results.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use super::{StoreContent, StoreHit, StoreQuery, StoreRecord, VectorCollection};

#[derive(Clone)]
pub struct ChromaCollection {
    base_url: String,
    client: Client,
    name: String,
    collection_id: String,
}

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Deserialize)]
struct GetResponse {
    ids: Vec<String>,
}

/// Query responses come back as one-element batches: the outer vector has
/// one entry per query in the request batch.
#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    uris: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Value>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

impl ChromaCollection {
    /// Open (or create) a named collection and log its current size.
    pub async fn open(base_url: &str, name: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::new();

        let url = format!("{}/api/v1/collections", base_url);
        let res = client
            .post(&url)
            .json(&json!({
                "name": name,
                "get_or_create": true,
                "metadata": { "source": name },
            }))
            .send()
            .await
            .map_err(AppError::store)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "failed to open collection '{}': {}",
                name, text
            )));
        }

        let info: CollectionInfo = res.json().await.map_err(AppError::store)?;
        let collection = Self {
            base_url,
            client,
            name: name.to_string(),
            collection_id: info.id,
        };

        let size = collection.count().await?;
        tracing::info!("Collection '{}' opened ({} items)", name, size);
        Ok(collection)
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{}",
            self.base_url, self.collection_id, suffix
        )
    }
}

#[async_trait]
impl VectorCollection for ChromaCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<usize, AppError> {
        let res = self
            .client
            .get(self.url("count"))
            .send()
            .await
            .map_err(AppError::store)?;

        if !res.status().is_success() {
            return Err(AppError::Store(format!(
                "count failed for '{}': {}",
                self.name,
                res.status()
            )));
        }

        res.json::<usize>().await.map_err(AppError::store)
    }

    async fn list_ids(&self) -> Result<Vec<String>, AppError> {
        // Full scan: ids only, no payloads. The store exposes no has-id
        // primitive, so dedup enumerates everything.
        let res = self
            .client
            .post(self.url("get"))
            .json(&json!({ "include": [] }))
            .send()
            .await
            .map_err(AppError::store)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "id enumeration failed for '{}': {}",
                self.name, text
            )));
        }

        let response: GetResponse = res.json().await.map_err(AppError::store)?;
        Ok(response.ids)
    }

    async fn add(&self, records: &[StoreRecord]) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let metadatas: Vec<&Value> = records.iter().map(|r| &r.metadata).collect();

        let mut body = json!({ "ids": ids, "metadatas": metadatas });
        let contents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        let content_key = match records[0].content {
            StoreContent::Document(_) => "documents",
            StoreContent::ImageUri(_) => "uris",
        };
        body[content_key] = json!(contents);

        let res = self
            .client
            .post(self.url("add"))
            .json(&body)
            .send()
            .await
            .map_err(AppError::store)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "add of {} records to '{}' failed: {}",
                records.len(),
                self.name,
                text
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        query: &StoreQuery,
        max_results: usize,
    ) -> Result<Vec<StoreHit>, AppError> {
        // The wire protocol is batch-oriented; a single query is wrapped
        // into a one-element batch.
        let mut body = json!({
            "n_results": max_results,
            "include": ["documents", "uris", "metadatas", "distances"],
        });
        match query {
            StoreQuery::Text(text) => body["query_texts"] = json!([text]),
            StoreQuery::ImageBase64(data) => body["query_images"] = json!([data]),
        }

        let res = self
            .client
            .post(self.url("query"))
            .json(&body)
            .send()
            .await
            .map_err(AppError::store)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "query against '{}' failed: {}",
                self.name, text
            )));
        }

        let response: QueryResponse = res.json().await.map_err(AppError::store)?;
        let ids = response.ids.into_iter().next().unwrap_or_default();
        let documents = response
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let uris = response
            .uris
            .and_then(|u| u.into_iter().next())
            .unwrap_or_default();
        let metadatas = response
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default();
        let distances = response
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();

        let hits = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| StoreHit {
                id,
                document: documents.get(i).cloned().flatten(),
                uri: uris.get(i).cloned().flatten(),
                metadata: metadatas
                    .get(i)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| json!({})),
                distance: distances.get(i).copied().unwrap_or(f32::MAX),
            })
            .collect();

        Ok(hits)
    }
}
