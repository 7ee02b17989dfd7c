//! Test support utilities for helmgate integration tests.
//!
//! Provides an isolated environment with a fake `helm` script standing in
//! for the real tool.

#![allow(dead_code)]

pub mod assertions;
pub mod fake;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fake::*;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use helmgate::core::profile::ToolProfile;
use helmgate::core::session::Session;

/// Test environment with isolated temp directories.
///
/// Nothing process-global is changed, so tests only need `#[serial]` to
/// keep freshly written scripts from being exec'd while another thread
/// still holds them open for writing.
pub struct Test {
    /// Working directory handed to the tool (stands in for a chart dir)
    pub dir: TempDir,
    /// Parent for session homes and transient secret files
    pub tmp: TempDir,
    /// Holds the fake tool script
    pub bin: TempDir,
    /// Path to the fake tool
    pub tool: PathBuf,
}

impl Test {
    /// Environment whose fake tool reports `version_line` and succeeds.
    pub fn new(version_line: &str) -> Self {
        Self::with_script(&FakeTool::new(version_line))
    }

    /// Environment whose fake tool fails every non-version command.
    pub fn failing(version_line: &str, exit_code: i32) -> Self {
        Self::with_script(&FakeTool::new(version_line).failing(exit_code))
    }

    fn with_script(fake: &FakeTool) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let tmp = TempDir::new().expect("failed to create temp dir");
        let bin = TempDir::new().expect("failed to create bin dir");
        let tool = fake.install(bin.path());
        Self {
            dir,
            tmp,
            bin,
            tool,
        }
    }

    /// Tool path as a string for profiles and CLI flags.
    pub fn tool_str(&self) -> String {
        self.tool.display().to_string()
    }

    /// Session bound to `profile`, running the fake tool.
    pub fn session(&self, profile: ToolProfile) -> Session {
        Session::with_profile(
            self.dir.path(),
            profile.with_binary(self.tool_str()),
            Some(self.tmp.path()),
        )
        .expect("failed to open session")
    }

    /// Entries currently in the temp parent directory.
    pub fn tmp_entries(&self) -> Vec<PathBuf> {
        list_dir(self.tmp.path())
    }
}

/// Sorted directory listing.
pub fn list_dir(path: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
        .expect("failed to read dir")
        .map(|e| e.expect("bad dir entry").path())
        .collect();
    entries.sort();
    entries
}
