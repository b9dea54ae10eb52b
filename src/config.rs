//! Configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::emit::EmitterConfig;
use crate::geo::Bounds;
use crate::geocoding::GeocodingConfig;
use crate::scrapers::DirectoryConfig;

/// Basename looked up in the working directory when no `--config` is given.
pub const CONFIG_BASENAME: &str = "pharmacollect";

const CONFIG_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

pub const API_KEY_ENV: &str = "PLACES_API_KEY";
pub const OUTPUT_DIR_ENV: &str = "PHARMACOLLECT_OUTPUT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("no places API key configured; set {} or geocoding.api_key", API_KEY_ENV)]
    MissingApiKey,
}

/// Where pipeline artifacts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory; relative file names below resolve against it.
    pub dir: String,
    pub raw_file: String,
    pub records_file: String,
    pub checkpoint_dir: String,
    pub checkpoint_prefix: String,
    pub kotlin_file: String,
    /// Application source directory the Kotlin file is copied into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            raw_file: "pharmacies_raw.json".to_string(),
            records_file: "pharmacies.json".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            checkpoint_prefix: "checkpoint".to_string(),
            kotlin_file: "KenitraPharmacyData.kt".to_string(),
            install_dir: None,
        }
    }
}

/// Settings for the `stats` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub bounds: Bounds,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub directory: DirectoryConfig,
    pub geocoding: GeocodingConfig,
    pub output: OutputConfig,
    pub emitter: EmitterConfig,
    pub stats: StatsConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load from an explicit path, or the first `pharmacollect.*` found in
    /// the working directory, or defaults. Environment overrides apply last.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config(Path::new(".")),
        };

        let mut config = match path {
            Some(path) => Self::load_from_path(&path).await?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path, parsed by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error("TOML", e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error("JSON", e.to_string()))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply `PLACES_API_KEY` and `PHARMACOLLECT_OUTPUT_DIR`. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(API_KEY_ENV) {
            self.geocoding.api_key = Some(key);
        }
        if let Some(dir) = get(OUTPUT_DIR_ENV) {
            self.output.dir = dir;
        }
    }

    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.geocoding
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// The output directory, resolved against the config file location.
    pub fn output_dir(&self) -> PathBuf {
        let base = self.base_dir().unwrap_or_else(|| PathBuf::from("."));
        self.resolve_path(&self.output.dir, &base)
    }

    /// Resolve a file name against the output directory.
    pub fn output_path(&self, file: &str) -> PathBuf {
        self.resolve_path(file, &self.output_dir())
    }

    pub fn raw_path(&self) -> PathBuf {
        self.output_path(&self.output.raw_file)
    }

    pub fn records_path(&self) -> PathBuf {
        self.output_path(&self.output.records_file)
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.output_path(&self.output.checkpoint_dir)
    }

    pub fn kotlin_path(&self) -> PathBuf {
        self.output_path(&self.output.kotlin_file)
    }

    pub fn install_dir(&self) -> Option<PathBuf> {
        let base = self.base_dir().unwrap_or_else(|| PathBuf::from("."));
        self.output
            .install_dir
            .as_deref()
            .map(|dir| self.resolve_path(dir, &base))
    }
}

/// Look for `pharmacollect.{toml,yaml,yml,json}` in a directory.
fn find_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", CONFIG_BASENAME, ext)))
        .find(|path| path.exists())
}
