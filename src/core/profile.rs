//! Tool generations and version detection.
//!
//! Everything that differs between helm 2 and helm 3 lives in a
//! [`ToolProfile`]. A session picks one profile up front and the command
//! builders read from it, so no other code checks versions.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::command;
use crate::core::constants::{DEFAULT_BINARY, LEGACY_BINARY};
use crate::core::redact::Redactor;
use crate::core::runner::{self, ToolEnvironment};
use crate::error::{Error, Result, VersionError};

/// First `v<major>.<minor>.<patch>` token, with optional pre-release and
/// build metadata (`v2.16.1+gbbdfe5e`, `v3.0.0-beta.3`).
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)")
        .expect("version regex is valid")
});

/// Known tool generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// helm 2.x: needs a client-side `init`, older sub-command names.
    Legacy,
    /// helm 3.x.
    Modern,
}

impl Generation {
    /// Generation for a tool major version.
    pub fn from_major(major: u64) -> Option<Self> {
        match major {
            2 => Some(Self::Legacy),
            3 => Some(Self::Modern),
            _ => None,
        }
    }

    /// Default profile for this generation.
    pub fn profile(self) -> ToolProfile {
        match self {
            Self::Legacy => ToolProfile::legacy(),
            Self::Modern => ToolProfile::modern(),
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Modern => write!(f, "modern"),
        }
    }
}

/// Version-specific facts about the installed tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolProfile {
    pub generation: Generation,
    pub binary_name: String,
    /// Whether `init --client-only` exists and must run before other commands.
    pub init_supported: bool,
    /// Sub-command that downloads a chart (`fetch` / `pull`).
    pub pull_command: String,
    /// Sub-command that prints chart values (`inspect` / `show`).
    pub show_command: String,
    /// Flag naming the release in `template` (`--name` / `--name-template`).
    pub template_name_arg: String,
    /// Whether `template` accepts `--kube-version`.
    pub kube_version_supported: bool,
}

impl ToolProfile {
    pub fn legacy() -> Self {
        Self {
            generation: Generation::Legacy,
            binary_name: LEGACY_BINARY.to_string(),
            init_supported: true,
            pull_command: "fetch".to_string(),
            show_command: "inspect".to_string(),
            template_name_arg: "--name".to_string(),
            kube_version_supported: true,
        }
    }

    pub fn modern() -> Self {
        Self {
            generation: Generation::Modern,
            binary_name: DEFAULT_BINARY.to_string(),
            init_supported: false,
            pull_command: "pull".to_string(),
            show_command: "show".to_string(),
            template_name_arg: "--name-template".to_string(),
            kube_version_supported: false,
        }
    }

    /// Same facts, different executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary_name = binary.into();
        self
    }
}

/// Extract the tool version from `version` output.
pub fn parse_version(output: &str) -> std::result::Result<semver::Version, VersionError> {
    VERSION_RE
        .captures(output)
        .and_then(|caps| semver::Version::parse(&caps[1]).ok())
        .ok_or_else(|| VersionError::Unparseable {
            output: output.trim().to_string(),
        })
}

/// Map a version to its profile, refusing anything but 2.x and 3.x.
pub fn profile_for_version(version: &semver::Version) -> std::result::Result<ToolProfile, VersionError> {
    Generation::from_major(version.major)
        .map(Generation::profile)
        .ok_or_else(|| VersionError::Unsupported {
            version: version.clone(),
        })
}

/// Ask `binary` for its version and return the matching profile.
///
/// The returned profile runs `binary`, whichever generation it reports.
pub fn resolve(binary: &str, work_dir: &Path, env: &ToolEnvironment) -> Result<ToolProfile> {
    which::which(binary).map_err(|_| VersionError::NotInstalled {
        binary: binary.to_string(),
    })?;

    let args = command::version_query();
    let output = runner::run_program(
        binary,
        args.as_slice(),
        work_dir,
        env,
        &Redactor::new(),
    )
    .map_err(|e| match e {
        Error::Execution(inner) => Error::Version(VersionError::Query(inner)),
        other => other,
    })?;

    let version = parse_version(&output)?;
    let profile = profile_for_version(&version)?.with_binary(binary);
    debug!(%version, generation = %profile.generation, binary, "resolved tool profile");
    Ok(profile)
}
