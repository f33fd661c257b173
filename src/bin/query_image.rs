//! One-shot image query against the assistant.

use std::path::PathBuf;

use clap::Parser;

use shopmate_backend::config::{AppConfig, AppPaths};
use shopmate_backend::{logging, state};

#[derive(Parser)]
#[command(name = "query-image")]
#[command(about = "Find products similar to an image")]
struct Args {
    /// Path to the query image
    #[arg(long)]
    image_path: PathBuf,

    /// Neighbors requested from the image collection
    #[arg(long)]
    max_results: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_cli();
    let args = Args::parse();

    let paths = AppPaths::new();
    let mut config = AppConfig::load(&paths)?;
    if let Some(max_results) = args.max_results {
        config.max_results = max_results;
    }

    let assistant = state::build_assistant(&config).await?;
    let envelope = assistant.answer_by_image(&args.image_path).await?;

    println!("\nAnswer:");
    println!("{}", envelope.answer);

    println!("\nSources:");
    for (index, result) in envelope.images.iter().enumerate() {
        let meta = &result.metadata;
        println!("\nSource {}:", index + 1);
        println!("Product ID: {}", meta["product_id"].as_str().unwrap_or("N/A"));
        println!("Name: {}", meta["name"].as_str().unwrap_or("N/A"));
        println!("Price: ${}", meta["discount_price"].as_str().unwrap_or("N/A"));
        println!("Rating: {}", meta["ratings"].as_str().unwrap_or("N/A"));
    }

    Ok(())
}
