//! Runtime configuration from flags and environment

use anyhow::{Context, Result};
use libris_core::{FileStore, GeminiClient, GeminiConfig, Library};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `store.json`
    pub data_dir: PathBuf,

    pub api_key: Option<String>,
    pub timeout: Duration,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
}

impl Config {
    /// Resolve from the `--data-dir` flag and `LIBRIS_*` variables
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir
            .or_else(|| env("LIBRIS_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        let timeout = match env("LIBRIS_SERVICE_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse()
                .with_context(|| format!("LIBRIS_SERVICE_TIMEOUT_SECS is not a number: {}", secs))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            data_dir,
            api_key: env("LIBRIS_API_KEY").or_else(|| env("GEMINI_API_KEY")),
            timeout: Duration::from_secs(timeout),
            text_model: env("LIBRIS_TEXT_MODEL"),
            image_model: env("LIBRIS_IMAGE_MODEL"),
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }

    /// A handle on the key-value file
    pub fn store(&self) -> FileStore {
        FileStore::new(self.store_path())
    }

    pub fn open_library(&self) -> Library<FileStore> {
        tracing::debug!("Opening library at {:?}", self.store_path());
        Library::load(self.store())
    }

    /// Build the AI client; fails without an API key
    pub fn service(&self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .clone()
            .context("No API key configured (set LIBRIS_API_KEY or GEMINI_API_KEY)")?;

        let mut config = GeminiConfig::new(api_key).with_timeout(self.timeout);
        if let Some(model) = &self.text_model {
            config = config.with_text_model(model);
        }
        if let Some(model) = &self.image_model {
            config = config.with_image_model(model);
        }

        GeminiClient::new(config).context("Failed to create AI client")
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "libris", "Libris") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from("libris_data")
    }
}
