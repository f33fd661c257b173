//! Download product images referenced by the catalog's `image` URL column
//! into the image directory, one `{product_id}.jpg` per row.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use shopmate_backend::config::AppPaths;
use shopmate_backend::errors::AppError;
use shopmate_backend::logging;

#[derive(Parser)]
#[command(name = "fetch-images")]
#[command(about = "Download product images listed in the catalog CSV")]
struct Args {
    /// Catalog CSV (default: <data>/raw/electronics_product.csv)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Target image directory (default: <data>/images/images_electronics)
    #[arg(long)]
    images: Option<PathBuf>,

    /// Remove the target directory before downloading
    #[arg(long)]
    clean: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_cli();
    let args = Args::parse();

    let paths = AppPaths::new();
    let catalog_file = args.catalog.unwrap_or_else(|| paths.catalog_file());
    let image_dir = args.images.unwrap_or_else(|| paths.image_dir.clone());

    if args.clean && image_dir.exists() {
        std::fs::remove_dir_all(&image_dir)?;
    }
    std::fs::create_dir_all(&image_dir)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&catalog_file)
        .map_err(|e| AppError::Catalog(format!("failed to open {}: {}", catalog_file.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::Catalog(format!("failed to read header row: {}", e)))?;
    let url_column = headers
        .iter()
        .position(|h| h == "image")
        .ok_or_else(|| AppError::Catalog("missing required column: image".to_string()))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let mut downloaded = 0usize;
    let mut failed = 0usize;
    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| AppError::Catalog(format!("row {}: {}", row_idx + 1, e)))?;
        // The first column holds the identifier regardless of its header.
        let id = record.get(0).map(str::trim).unwrap_or_default();
        let url = record.get(url_column).map(str::trim).unwrap_or_default();
        if id.is_empty() || url.is_empty() {
            continue;
        }

        match fetch(&client, url).await {
            Ok(bytes) => {
                std::fs::write(image_dir.join(format!("{id}.jpg")), &bytes)?;
                downloaded += 1;
            }
            Err(err) => {
                tracing::warn!("Failed to download {}: {}", url, err);
                failed += 1;
            }
        }
    }

    println!("Downloaded: {downloaded}");
    println!("Failed:     {failed}");

    Ok(())
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, AppError> {
    let res = client.get(url).send().await.map_err(AppError::internal)?;
    if !res.status().is_success() {
        return Err(AppError::Internal(format!("status {}", res.status())));
    }
    let bytes = res.bytes().await.map_err(AppError::internal)?;
    Ok(bytes.to_vec())
}
