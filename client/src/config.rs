//! # Client Configuration
//!
//! Tunables for the catalog and the add-deal flow, stored as YAML. Every
//! field has a default, so a missing file or a partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use shared::Coordinates;
use thiserror::Error;

pub const CONFIG_DIR_NAME: &str = "grub";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("No configuration directory on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Quiet window before a search keystroke triggers a recompute
    pub search_debounce_ms: u64,
    pub default_radius_meters: f64,
    /// Accumulated restaurants farther than radius × this are dropped
    pub retain_radius_multiplier: f64,
    /// Used when no device location is available
    pub default_location: Coordinates,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    pub image_key_prefix: String,
    /// Prefix turning stored image keys into download URLs
    pub image_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 500,
            default_radius_meters: 1000.0,
            retain_radius_multiplier: 3.0,
            default_location: Coordinates::new(43.5315, -79.6131),
            log_filter: "info".to_string(),
            image_key_prefix: "deal".to_string(),
            image_base_url: String::new(),
        }
    }
}

impl ClientConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// `<config_dir>/grub/config.yaml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let yaml_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_str(&yaml_content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Writes through a temp file then renames over `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let yaml_content = serde_yaml::to_string(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content).map_err(io_error)?;
        fs::rename(&temp_path, path).map_err(io_error)?;
        Ok(())
    }
}
