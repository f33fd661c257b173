//! Bulk-ingest the product catalog and images into both collections.

use std::path::PathBuf;

use clap::Parser;

use shopmate_backend::config::{AppConfig, AppPaths};
use shopmate_backend::{catalog, ingest, logging, state};

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Ingest the product catalog into the text and image collections")]
struct Args {
    /// Catalog CSV (default: <data>/raw/electronics_product.csv)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Product image directory (default: <data>/images/images_electronics)
    #[arg(long)]
    images: Option<PathBuf>,

    /// Records per write batch
    #[arg(long)]
    batch_size: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_cli();
    let args = Args::parse();

    let paths = AppPaths::new();
    let config = AppConfig::load(&paths)?;
    let catalog_file = args.catalog.unwrap_or_else(|| paths.catalog_file());
    let image_dir = args.images.unwrap_or_else(|| paths.image_dir.clone());
    let batch_size = args.batch_size.unwrap_or(config.batch_size);

    let rows = catalog::load_catalog(&catalog_file)?;
    let (text_collection, image_collection) = state::open_collections(&config).await?;

    let report = ingest::ingest(
        text_collection.as_ref(),
        image_collection.as_ref(),
        &rows,
        &image_dir,
        batch_size,
    )
    .await?;

    println!("Rows in catalog:    {}", report.rows);
    println!("Processed:          {}", report.processed);
    println!("Skipped (no image): {}", report.skipped_missing_image);
    println!(
        "Text collection:    {} items (+{})",
        report.text_total, report.text_added
    );
    println!(
        "Image collection:   {} items (+{})",
        report.image_total, report.image_added
    );

    Ok(())
}
