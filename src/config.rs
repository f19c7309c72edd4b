/// Configuration for the FAQ engine.
///
/// Loaded from a JSON file; every field has a default so partial files work.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::index::IdStrategy;
use crate::models::RetrievalContext;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

// ── Default value functions ──────────────────────────────────────────

fn default_source_path() -> PathBuf {
    PathBuf::from("PERGUNTAS E RESPOSTAS (SITE).xlsx")
}

fn default_collection_name() -> String {
    "qa_excel_collection".to_string()
}

fn default_search_top_k() -> usize {
    3
}

fn default_model_name() -> String {
    "multilingual-e5-small".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models/multilingual-e5-small")
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Spreadsheet with question / age / answer columns.
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,

    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Store directory; `./faq_store_<collection_name>` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    #[serde(default)]
    pub force_rebuild: bool,

    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,

    #[serde(default)]
    pub id_strategy: IdStrategy,

    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    #[serde(default = "default_model_dir")]
    pub dir: PathBuf,

    /// Use the deterministic hash embedder instead of the ONNX model.
    #[serde(default)]
    pub use_mock: bool,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            collection_name: default_collection_name(),
            storage_dir: None,
            force_rebuild: false,
            search_top_k: default_search_top_k(),
            id_strategy: IdStrategy::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            dimensions: default_dimensions(),
            dir: default_model_dir(),
            use_mock: false,
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields defaults (and a template is written when the
    /// default path is used); invalid JSON is logged and also yields defaults.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("{} not found, using defaults", config_path.display());
            let cfg = Self::default();

            if config_path == Path::new(DEFAULT_CONFIG_PATH) {
                match cfg.save(config_path) {
                    Ok(()) => info!("Generated config template: {DEFAULT_CONFIG_PATH}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))?;

        match serde_json::from_str(&data) {
            Ok(cfg) => {
                info!("Loaded configuration from {}", config_path.display());
                Ok(cfg)
            }
            Err(e) => {
                warn!("Invalid JSON in {}: {e}", config_path.display());
                warn!("Using default configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.collection_name.trim().is_empty(),
            "collection_name must not be empty"
        );
        anyhow::ensure!(self.search_top_k > 0, "search_top_k must be positive");
        anyhow::ensure!(
            self.model.dimensions > 0,
            "model.dimensions must be positive"
        );
        Ok(())
    }

    #[must_use]
    pub fn retrieval_context(&self) -> RetrievalContext {
        RetrievalContext::new(&self.collection_name, self.storage_dir.as_deref())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
