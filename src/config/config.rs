//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{AccessMode, Storage, StorageBuilder, TextEncoding};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Storage backend configuration (`[storage]` table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend name: "json" (alias "file") or "memory"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Database file, required by the json backend
    pub path: Option<PathBuf>,
    /// Create missing parent directories of `path`
    #[serde(default = "default_create_parent_dirs")]
    pub create_parent_dirs: bool,
    /// File access mode, e.g. "r+"
    #[serde(default)]
    pub access_mode: AccessMode,
    /// Text encoding of the database file
    #[serde(default)]
    pub encoding: TextEncoding,
    /// Pretty-print indentation; compact output when unset
    pub indent: Option<usize>,
    /// Sort object keys on write
    #[serde(default)]
    pub sort_keys: bool,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_create_parent_dirs() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            create_parent_dirs: true,
            access_mode: AccessMode::default(),
            encoding: TextEncoding::default(),
            indent: None,
            sort_keys: false,
        }
    }
}

impl StorageConfig {
    /// Translate into a [`StorageBuilder`]
    pub fn to_builder(&self) -> StorageBuilder {
        let mut builder = StorageBuilder::new(&self.backend);
        if self.backend == "memory" {
            return builder;
        }

        if let Some(path) = &self.path {
            builder = builder.with_path(path);
        }
        builder = builder
            .with_option("create_parent_dirs", &self.create_parent_dirs.to_string())
            .with_option("access_mode", self.access_mode.as_str())
            .with_option("encoding", self.encoding.as_str())
            .with_option("sort_keys", &self.sort_keys.to_string());
        if let Some(indent) = self.indent {
            builder = builder.with_option("indent", &indent.to_string());
        }
        builder
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// Where the configuration was (or would have been) read from
    pub config_path: PathBuf,
    /// The loaded configuration
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses
    ///   `config/docstore.toml`; a missing file yields the default config.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config/docstore.toml"));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            Configuration::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: PathBuf::from("config/docstore.toml"),
            config,
        }
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Open the configured storage backend.
    pub fn open_storage(&self) -> Result<Box<dyn Storage>> {
        self.config.storage.to_builder().build().with_context(|| {
            format!(
                "Failed to open {} storage from {}",
                self.config.storage.backend,
                self.config_path.display()
            )
        })
    }
}
