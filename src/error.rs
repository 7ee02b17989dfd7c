//! Error types for helmgate.
//!
//! Each layer has its own error enum; [`Error`] wraps them so callers can
//! match on the failing layer while still using a single `Result` alias.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error returned by every public operation.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An operation was attempted on a session that has already been closed.
    #[error("session is closed")]
    SessionClosed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while detecting which tool generation is installed.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("{binary} not found on PATH")]
    NotInstalled { binary: String },

    #[error("version query failed: {0}")]
    Query(#[source] ExecutionError),

    #[error("could not parse a version from output: {output}")]
    Unparseable { output: String },

    #[error("unsupported version {version} (expected 2.x or 3.x)")]
    Unsupported { version: semver::Version },
}

/// Failures while writing secret material to transient files.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("failed to create temporary {kind} file: {source}")]
    TempFile {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write temporary {kind} file: {source}")]
    Write {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the external tool itself.
///
/// Any output carried here has already been redacted.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {}: {output}", describe_exit(.exit_code))]
    Failed {
        program: String,
        /// `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
        output: String,
    },
}

impl ExecutionError {
    /// Exit code of the failed process, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionError::Failed { exit_code, .. } => *exit_code,
            ExecutionError::Launch { .. } => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Failures while loading `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
