//! Application paths and configuration.
//!
//! Paths are discovered relative to the project root (overridable through
//! environment variables) and created on startup. Settings load from an
//! optional `config.yaml` at the project root; the OpenAI API key is only
//! ever read from the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub raw_data_dir: PathBuf,
    pub image_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let data_dir = discover_data_dir(&project_root);
        let raw_data_dir = data_dir.join("raw");
        let image_dir = data_dir.join("images").join("images_electronics");
        let upload_dir = data_dir.join("images").join("user_uploads");
        let log_dir = data_dir.join("logs");

        for dir in [&raw_data_dir, &image_dir, &upload_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            project_root,
            raw_data_dir,
            image_dir,
            upload_dir,
            log_dir,
        }
    }

    /// Default location of the product catalog CSV.
    pub fn catalog_file(&self) -> PathBuf {
        self.raw_data_dir.join("electronics_product.csv")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("SHOPMATE_ROOT") {
        return PathBuf::from(root);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("config.yaml").exists() {
        return manifest_dir;
    }

    env::current_dir().unwrap_or(manifest_dir)
}

fn discover_data_dir(project_root: &Path) -> PathBuf {
    if let Ok(dir) = env::var("SHOPMATE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    project_root.join("data")
}

/// Settings for the external embedding store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub text_collection: String,
    pub image_collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            text_collection: "electronics_text_dataset".to_string(),
            image_collection: "electronics_image_dataset".to_string(),
        }
    }
}

/// Settings for the chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub model: ModelConfig,
    /// Neighbors requested per collection on each query.
    pub max_results: usize,
    /// Records per write batch during ingestion.
    pub batch_size: usize,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            model: ModelConfig::default(),
            max_results: 5,
            batch_size: 3500,
            server_port: 8300,
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.yaml` under the project root,
    /// falling back to defaults when the file is absent.
    pub fn load(paths: &AppPaths) -> Result<Self, AppError> {
        let config_path = paths.project_root.join("config.yaml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("failed to read {}: {}", config_path.display(), e))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            AppError::Config(format!("failed to parse {}: {}", config_path.display(), e))
        })
    }

    /// The OpenAI API key, from the environment only.
    pub fn api_key(&self) -> Result<String, AppError> {
        env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::Config("OPENAI_API_KEY is not set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_dataset() {
        let config = AppConfig::default();
        assert_eq!(config.store.text_collection, "electronics_text_dataset");
        assert_eq!(config.store.image_collection, "electronics_image_dataset");
        assert_eq!(config.batch_size, 3500);
        assert_eq!(config.max_results, 5);
    }

    #[test]
    fn parses_partial_yaml() {
        let parsed: AppConfig =
            serde_yaml::from_str("store:\n  base_url: http://chroma:9000\n").unwrap();
        assert_eq!(parsed.store.base_url, "http://chroma:9000");
        assert_eq!(parsed.model.model, "gpt-4o");
    }
}
