//! Child-process execution for the tool.
//!
//! The child inherits the parent environment plus the overrides in a
//! [`ToolEnvironment`], which point every cache/config/data location at a
//! private home directory. The parent environment itself is never touched.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, trace};

use crate::core::constants::HOME_OVERRIDES;
use crate::core::profile::ToolProfile;
use crate::core::redact::Redactor;
use crate::error::{ExecutionError, Result};

/// Environment overrides applied to every child process of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolEnvironment {
    overrides: Vec<(String, PathBuf)>,
}

impl ToolEnvironment {
    /// Overrides rooting the tool's cache, config, data and home under `home`.
    pub fn isolated(home: &Path) -> Self {
        let overrides = HOME_OVERRIDES
            .iter()
            .map(|(var, sub)| {
                let path = if sub.is_empty() {
                    home.to_path_buf()
                } else {
                    home.join(sub)
                };
                (var.to_string(), path)
            })
            .collect();
        Self { overrides }
    }

    /// Add or replace a single override.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.overrides.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.overrides.push((name, value)),
        }
        self
    }

    /// Value set for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.overrides
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_path())
    }

    /// All overrides in insertion order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.overrides.iter().map(|(n, v)| (n.as_str(), v.as_path()))
    }
}

/// Run the profile's binary with `args`.
///
/// Returns stdout followed by stderr on success. On a nonzero exit the same
/// combined output is attached to [`ExecutionError::Failed`]. Both are
/// redacted.
pub fn run<S: AsRef<str>>(
    profile: &ToolProfile,
    args: &[S],
    work_dir: &Path,
    env: &ToolEnvironment,
    redactor: &Redactor,
) -> Result<String> {
    run_program(&profile.binary_name, args, work_dir, env, redactor)
}

/// Same as [`run`] for an explicit program name.
pub fn run_program<S: AsRef<str>>(
    program: &str,
    args: &[S],
    work_dir: &Path,
    env: &ToolEnvironment,
    redactor: &Redactor,
) -> Result<String> {
    debug!(
        command = %redactor.redact_args(program, args),
        dir = %work_dir.display(),
        "running"
    );

    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|a| a.as_ref())).current_dir(work_dir);
    for (name, value) in env.vars() {
        cmd.env(name, value);
    }

    let output = cmd.output().map_err(|source| ExecutionError::Launch {
        program: program.to_string(),
        source,
    })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let combined = redactor.redact(&combined);

    trace!(
        stdout_len = output.stdout.len(),
        stderr_len = output.stderr.len(),
        status = ?output.status.code(),
        "process finished"
    );

    if !output.status.success() {
        return Err(ExecutionError::Failed {
            program: program.to_string(),
            exit_code: output.status.code(),
            output: combined,
        }
        .into());
    }

    Ok(combined)
}
