//! Collision tuning files
//!
//! [`CollisionConfig`] is read from and written to `.toml` or `.ron` files,
//! picked by extension. Missing keys fall back to [`Default`].

pub use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk encodings a config file may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Format::Toml),
            Some("ron") => Ok(Format::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Settings that round-trip through a TOML or RON file
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Read and parse the file at `path`
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse `contents` in the format implied by the extension of `path`
    fn from_str_with_format(contents: &str, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Format::from_path(path.as_ref())? {
            Format::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Write these settings to `path`, pretty-printed
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::from_path(path)? {
            Format::Toml => toml::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Failures while reading or writing collision settings
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read or written
    #[error("Could not access collision config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents are not valid settings
    #[error("Invalid collision config: {0}")]
    Parse(String),

    /// The settings could not be encoded
    #[error("Could not encode collision config: {0}")]
    Serialize(String),

    /// The file extension is neither `.toml` nor `.ron`
    #[error("Collision config must be a .toml or .ron file, got {0}")]
    UnsupportedFormat(String),
}

/// Tuning knobs for a [`CollisionManager`](crate::physics::CollisionManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Sub-step count used by `CollisionManager::predict`
    pub swept_segments: u32,

    /// Emit a `trace!` line for every pair tested during a sweep
    pub trace_pairs: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            swept_segments: 8,
            trace_pairs: false,
        }
    }
}

impl Config for CollisionConfig {}
