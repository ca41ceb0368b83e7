//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document.  Fields missing
//! from the file take their defaults; a missing file means all defaults.
//! Saving validates first and replaces the file atomically (write to a
//! sibling temp file, then rename).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{ReaderConfig, validate_config};

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<ReaderConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", self.path.display());
                return Ok(ReaderConfig::default());
            }
            Err(_) => return Err(ConfigError::IoError),
        };
        let cfg = serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        info!("Loaded config from {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &ReaderConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let json = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|_| ConfigError::IoError)?;
        fs::rename(&tmp, &self.path).map_err(|_| ConfigError::IoError)?;
        info!("Saved config to {}", self.path.display());
        Ok(())
    }
}
