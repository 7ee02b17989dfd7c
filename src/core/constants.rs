//! Constants used throughout helmgate.
//!
//! Centralizes magic strings and configuration values.

/// Default tool binary looked up on PATH.
pub const DEFAULT_BINARY: &str = "helm";

/// Binary name conventionally used for a side-by-side helm 2 install.
pub const LEGACY_BINARY: &str = "helm2";

/// Prefix for session home directories and transient secret files.
pub const TEMP_PREFIX: &str = "helm";

/// Replacement text for redacted credential values.
pub const REDACTION_MASK: &str = "******";

/// Environment variables pointed at the session home, paired with the
/// subdirectory each one resolves to (empty for the home root itself).
pub const HOME_OVERRIDES: &[(&str, &str)] = &[
    ("XDG_CACHE_HOME", "cache"),
    ("XDG_CONFIG_HOME", "config"),
    ("XDG_DATA_HOME", "data"),
    ("HELM_HOME", ""),
];

/// Configuration file name under the user config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Application directory name under the user config directory.
pub const APP_DIR: &str = "helmgate";
