//! Document building: pairing catalog rows with product images.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::catalog::ProductRow;

/// A catalog row prepared for ingestion: the embedding-ready text summary,
/// the metadata record shared by both collections, and the image path.
/// Built transiently during ingestion and never persisted as-is.
#[derive(Debug, Clone)]
pub struct ProductDocument {
    pub product_id: String,
    pub text: String,
    pub metadata: Value,
    pub image_path: PathBuf,
}

/// Pair a row with its image and derive the ingestion document.
///
/// The expected image is `{product_id}.jpg` inside `image_dir`. A missing
/// image returns `None` rather than an error: partial catalogs are valid
/// and such rows are skipped.
///
/// The text template is deterministic so re-ingesting an unchanged row
/// reproduces the same stored content.
pub fn build_document(row: &ProductRow, image_dir: &Path) -> Option<ProductDocument> {
    let image_path = image_dir.join(format!("{}.jpg", row.product_id));
    if !image_path.is_file() {
        return None;
    }

    let text = format!(
        "Product: {}\nCategory: {}\nRating: {} ({} ratings)\nPrice: ${} (Original: ${})\n",
        row.name,
        row.sub_category,
        row.ratings,
        row.no_of_ratings,
        row.discount_price,
        row.actual_price,
    );

    let uri = image_path.to_string_lossy().into_owned();
    let metadata = json!({
        "product_id": row.product_id,
        "name": row.name,
        "sub_category": row.sub_category,
        "ratings": row.ratings,
        "discount_price": row.discount_price,
        "uri": uri,
    });

    Some(ProductDocument {
        product_id: row.product_id.clone(),
        text,
        metadata,
        image_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ProductRow {
        ProductRow {
            product_id: "123".to_string(),
            name: "Widget".to_string(),
            sub_category: "Audio".to_string(),
            ratings: "4.5".to_string(),
            no_of_ratings: "120".to_string(),
            discount_price: "19.99".to_string(),
            actual_price: "29.99".to_string(),
        }
    }

    #[test]
    fn builds_document_when_image_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("123.jpg"), b"jpeg").unwrap();

        let doc = build_document(&sample_row(), dir.path()).unwrap();
        assert_eq!(doc.product_id, "123");
        assert_eq!(doc.metadata["product_id"], "123");
        assert!(doc.text.contains("Widget"));
        assert!(doc.text.contains("4.5"));
        assert!(doc.metadata["uri"].as_str().unwrap().ends_with("123.jpg"));
    }

    #[test]
    fn missing_image_is_a_soft_skip() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_document(&sample_row(), dir.path()).is_none());
    }

    #[test]
    fn text_template_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("123.jpg"), b"jpeg").unwrap();

        let first = build_document(&sample_row(), dir.path()).unwrap();
        let second = build_document(&sample_row(), dir.path()).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(
            first.text,
            "Product: Widget\nCategory: Audio\nRating: 4.5 (120 ratings)\nPrice: $19.99 (Original: $29.99)\n"
        );
    }
}
