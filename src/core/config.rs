//! Settings file management.
//!
//! Settings live in `<config dir>/helmgate/config.toml` unless a path is
//! given explicitly. Every field has a default, so a missing file is not an
//! error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::{APP_DIR, CONFIG_FILE, DEFAULT_BINARY};
use crate::core::profile::{Generation, ToolProfile};
use crate::error::{ConfigError, Result};

/// Process-level settings for opening sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Tool executable, as a name on PATH or an absolute path.
    pub binary: String,
    /// Pin the tool generation instead of asking the binary.
    pub generation: Option<Generation>,
    /// Parent directory for session homes and transient secret files.
    pub temp_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            generation: None,
            temp_dir: None,
        }
    }
}

impl Settings {
    /// Default settings file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Load from `path` if given, else from the default location when it
    /// exists, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        let settings: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings)
    }

    /// The pinned profile, if a generation is configured.
    pub fn pinned_profile(&self) -> Option<ToolProfile> {
        self.generation
            .map(|generation| generation.profile().with_binary(&self.binary))
    }
}
