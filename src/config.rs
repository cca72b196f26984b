//! Runtime configuration, threaded explicitly into every operation.
//!
//! Loaded from a JSON file with camelCase keys; any missing key takes its
//! default:
//!
//! ```json
//! { "unitSize": 7, "errorLog": "error.log", "chunkSize": 65536, "spaceFactor": 2 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DnaError, Result};

/// Default unit width in bytes.
pub const DEFAULT_UNIT_SIZE:    usize = 7;
/// Default streaming read granularity: 64 KiB.
pub const DEFAULT_CHUNK_SIZE:   usize = 64 * 1024;
/// Free space required before packing, as a multiple of the input size.
pub const DEFAULT_SPACE_FACTOR: u64   = 2;
pub const DEFAULT_ERROR_LOG:    &str  = "error.log";
/// Looked up in the working directory when no config file is given.
pub const DEFAULT_CONFIG_FILE:  &str  = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub unit_size:    usize,
    pub error_log:    PathBuf,
    pub chunk_size:   usize,
    pub space_factor: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit_size:    DEFAULT_UNIT_SIZE,
            error_log:    PathBuf::from(DEFAULT_ERROR_LOG),
            chunk_size:   DEFAULT_CHUNK_SIZE,
            space_factor: DEFAULT_SPACE_FACTOR,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| DnaError::Config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DnaError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Load `path` if given, else [`DEFAULT_CONFIG_FILE`] if it exists, else
    /// defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.unit_size == 0 {
            return Err(DnaError::Config("unitSize must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(DnaError::Config("chunkSize must be at least 1".into()));
        }
        Ok(())
    }

    pub fn with_unit_size(mut self, unit_size: usize) -> Self {
        self.unit_size = unit_size;
        self
    }
}
