//! Catalog loading and validation.
//!
//! The product catalog is a CSV export of the source data set. Whatever the
//! first column is called, it is treated as the product identifier; the
//! remaining required columns keep their original names.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Columns a catalog file must provide, after the first column has been
/// renamed to `product_id`.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "product_id",
    "name",
    "sub_category",
    "ratings",
    "no_of_ratings",
    "discount_price",
    "actual_price",
];

/// One validated catalog row. All fields are kept as strings; the source
/// data set mixes numeric formats and currency symbols freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: String,
    pub name: String,
    pub sub_category: String,
    pub ratings: String,
    pub no_of_ratings: String,
    pub discount_price: String,
    pub actual_price: String,
}

/// Load and validate the catalog CSV.
///
/// Fatal errors: missing file, missing required column, empty required
/// field, or a duplicated product identifier. Partial catalogs are handled
/// later (rows without images are skipped during ingestion), but a
/// malformed file is rejected here in full.
pub fn load_catalog(path: &Path) -> Result<Vec<ProductRow>, AppError> {
    if !path.exists() {
        return Err(AppError::Catalog(format!(
            "catalog file {} not found",
            path.display()
        )));
    }

    tracing::info!("Loading catalog from {}", path.display());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| AppError::Catalog(format!("failed to open {}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::Catalog(format!("failed to read header row: {}", e)))?;
    let mut columns: Vec<String> = headers.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(AppError::Catalog("catalog file has no columns".to_string()));
    }
    // The first column holds the identifier regardless of its header name.
    columns[0] = "product_id".to_string();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Catalog(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let indices: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .map(|required| {
            columns
                .iter()
                .position(|c| c == required)
                .ok_or_else(|| AppError::Catalog(format!("missing required column: {required}")))
        })
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::new();
    let mut seen_ids = HashSet::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| AppError::Catalog(format!("row {}: {}", row_idx + 1, e)))?;

        let field = |slot: usize| -> Result<String, AppError> {
            let value = record
                .get(indices[slot])
                .map(str::trim)
                .unwrap_or_default();
            if value.is_empty() {
                return Err(AppError::Catalog(format!(
                    "row {}: empty required field '{}'",
                    row_idx + 1,
                    REQUIRED_COLUMNS[slot]
                )));
            }
            Ok(value.to_string())
        };

        let row = ProductRow {
            product_id: field(0)?,
            name: field(1)?,
            sub_category: field(2)?,
            ratings: field(3)?,
            no_of_ratings: field(4)?,
            discount_price: field(5)?,
            actual_price: field(6)?,
        };

        if !seen_ids.insert(row.product_id.clone()) {
            return Err(AppError::Catalog(format!(
                "row {}: duplicate product_id '{}'",
                row_idx + 1,
                row.product_id
            )));
        }
        rows.push(row);
    }

    tracing::info!("Loaded {} products", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const HEADER: &str =
        "id,name,sub_category,ratings,no_of_ratings,discount_price,actual_price\n";

    #[test]
    fn renames_first_column_to_product_id() {
        let file = write_csv(&format!("{HEADER}42,Widget,Audio,4.5,120,19.99,29.99\n"));
        let rows = load_catalog(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_id, "42");
        assert_eq!(rows[0].name, "Widget");
    }

    #[test]
    fn rejects_missing_column() {
        let file = write_csv("id,name,sub_category,ratings\n42,Widget,Audio,4.5\n");
        let err = load_catalog(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
        assert!(err.to_string().contains("no_of_ratings"));
    }

    #[test]
    fn rejects_duplicate_identifier() {
        let file = write_csv(&format!(
            "{HEADER}42,Widget,Audio,4.5,120,19.99,29.99\n42,Other,Audio,4.0,3,9.99,9.99\n"
        ));
        let err = load_catalog(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate product_id"));
    }

    #[test]
    fn rejects_empty_required_field() {
        let file = write_csv(&format!("{HEADER}42,,Audio,4.5,120,19.99,29.99\n"));
        let err = load_catalog(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty required field 'name'"));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_catalog(Path::new("/nonexistent/products.csv")).unwrap_err();
        assert!(matches!(err, AppError::Catalog(_)));
    }
}
