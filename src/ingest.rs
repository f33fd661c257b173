//! Batch ingestion of catalog rows into both collections.
//!
//! Dedup runs independently per collection against a full enumeration of
//! its existing identifiers, so re-running ingestion with unchanged inputs
//! is a no-op, and a product missing from only one collection is
//! backfilled on the next run.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::catalog::ProductRow;
use crate::document::{build_document, ProductDocument};
use crate::errors::AppError;
use crate::store::{CollectionKind, StoreContent, StoreRecord, VectorCollection};

/// Counts reported after one ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Rows present in the catalog.
    pub rows: usize,
    /// Rows that produced a document (had a matching image).
    pub processed: usize,
    /// Rows skipped because no `{product_id}.jpg` exists.
    pub skipped_missing_image: usize,
    /// Records newly written to the text collection.
    pub text_added: usize,
    /// Records newly written to the image collection.
    pub image_added: usize,
    /// Text collection size after the run.
    pub text_total: usize,
    /// Image collection size after the run.
    pub image_total: usize,
}

fn to_record(document: &ProductDocument, kind: CollectionKind) -> StoreRecord {
    let content = match kind {
        CollectionKind::Text => StoreContent::Document(document.text.clone()),
        CollectionKind::Image => {
            StoreContent::ImageUri(document.image_path.to_string_lossy().into_owned())
        }
    };
    StoreRecord {
        id: document.product_id.clone(),
        content,
        metadata: document.metadata.clone(),
    }
}

/// Write the documents not yet present in `collection`, in sequential
/// batches of `batch_size`. Returns the number of records written.
///
/// A failure at batch K leaves batches 1..K-1 committed; the dedup step
/// makes a re-run resubmit only what is still missing.
async fn add_missing(
    collection: &dyn VectorCollection,
    documents: &[ProductDocument],
    kind: CollectionKind,
    batch_size: usize,
) -> Result<usize, AppError> {
    let existing: HashSet<String> = collection.list_ids().await?.into_iter().collect();
    let new_records: Vec<StoreRecord> = documents
        .iter()
        .filter(|d| !existing.contains(&d.product_id))
        .map(|d| to_record(d, kind))
        .collect();

    for (index, batch) in new_records.chunks(batch_size).enumerate() {
        collection.add(batch).await?;
        tracing::info!(
            "'{}': wrote batch #{} ({} records)",
            collection.name(),
            index + 1,
            batch.len()
        );
    }

    Ok(new_records.len())
}

/// Ingest catalog rows into both collections.
///
/// Rows without a matching image are skipped silently and surface only in
/// the report counts. Writes are sequential, batch by batch, per
/// collection; there is no partial visibility beyond "a batch is durable
/// once its write returns".
pub async fn ingest(
    text_collection: &dyn VectorCollection,
    image_collection: &dyn VectorCollection,
    rows: &[ProductRow],
    image_dir: &Path,
    batch_size: usize,
) -> Result<IngestReport, AppError> {
    if batch_size == 0 {
        return Err(AppError::Config("batch_size must be positive".to_string()));
    }

    let documents: Vec<ProductDocument> = rows
        .iter()
        .filter_map(|row| build_document(row, image_dir))
        .collect();
    let skipped = rows.len() - documents.len();
    if skipped > 0 {
        tracing::info!("Skipped {} rows without a matching image", skipped);
    }

    let text_added =
        add_missing(text_collection, &documents, CollectionKind::Text, batch_size).await?;
    let image_added =
        add_missing(image_collection, &documents, CollectionKind::Image, batch_size).await?;

    let report = IngestReport {
        rows: rows.len(),
        processed: documents.len(),
        skipped_missing_image: skipped,
        text_added,
        image_added,
        text_total: text_collection.count().await?,
        image_total: image_collection.count().await?,
    };

    tracing::info!(
        "Ingestion done: {} processed, {} skipped, text {} (+{}), images {} (+{})",
        report.processed,
        report.skipped_missing_image,
        report.text_total,
        report.text_added,
        report.image_total,
        report.image_added
    );

    Ok(report)
}
