//! Session.
//!
//! The primary interface for running the tool. A session owns a private
//! home directory that isolates the tool's cache, config and data, plus the
//! [`ToolProfile`] chosen when it was opened.
//!
//! Operations take `&mut self`, so a single session cannot run two commands
//! at once. Use one session per thread for concurrent work; their homes
//! never overlap.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::core::command::{self, TemplateOptions};
use crate::core::config::Settings;
use crate::core::constants::TEMP_PREFIX;
use crate::core::credentials::{self, Credentials, SecretFileNaming};
use crate::core::profile::{self, ToolProfile};
use crate::core::redact::Redactor;
use crate::core::runner::{self, ToolEnvironment};
use crate::error::{Error, Result};

/// Lifecycle of an open [`Session`].
///
/// The earlier `Created` phase (home allocated, no profile yet) is a
/// [`SessionHome`], so a `Session` always has a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Profile bound, ready for operations.
    Resolved,
    /// A child process is running.
    ///
    /// Operations hold `&mut self` while the child runs, so callers of this
    /// crate only ever observe `Resolved` or `Closed`; `Active` is internal
    /// bookkeeping visible in `Debug` output and logs.
    Active,
    /// Home removed; every operation fails with [`Error::SessionClosed`].
    Closed,
}

/// A freshly allocated session home with no profile bound yet.
///
/// Binding a profile consumes it, so a home is bound at most once.
#[derive(Debug)]
pub struct SessionHome {
    dir: TempDir,
    work_dir: PathBuf,
    secret_naming: SecretFileNaming,
}

impl SessionHome {
    /// Allocate a private home under `temp_dir` (or the system temp dir).
    pub fn create(work_dir: impl Into<PathBuf>, temp_dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match temp_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        let secret_naming = SecretFileNaming {
            dir: temp_dir.map(Path::to_path_buf),
            ..SecretFileNaming::default()
        };
        debug!(home = %dir.path().display(), "allocated session home");
        Ok(Self {
            dir,
            work_dir: work_dir.into(),
            secret_naming,
        })
    }

    /// Path of the private home.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Ask `binary` for its version and bind the matching profile.
    ///
    /// The version query already runs inside the isolated home. On failure
    /// the home is removed with `self`.
    pub fn resolve(self, binary: &str) -> Result<Session> {
        let env = ToolEnvironment::isolated(self.dir.path());
        let profile = profile::resolve(binary, &self.work_dir, &env)?;
        Ok(self.bind(profile))
    }

    /// Bind an explicit profile.
    pub fn bind(self, profile: ToolProfile) -> Session {
        let env = ToolEnvironment::isolated(self.dir.path());
        debug!(
            generation = %profile.generation,
            binary = %profile.binary_name,
            "session ready"
        );
        Session {
            state: SessionState::Resolved,
            home: Some(self.dir),
            work_dir: self.work_dir,
            profile,
            env,
            secret_naming: self.secret_naming,
        }
    }
}

/// One logical session against the tool.
pub struct Session {
    state: SessionState,
    home: Option<TempDir>,
    work_dir: PathBuf,
    profile: ToolProfile,
    env: ToolEnvironment,
    secret_naming: SecretFileNaming,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("home", &self.home())
            .field("work_dir", &self.work_dir)
            .field("profile", &self.profile)
            .finish()
    }
}

impl Session {
    // --- Construction ---
    /// Open a session in `work_dir` using `settings`.
    ///
    /// A generation pinned in the settings skips version detection;
    /// otherwise the configured binary is asked for its version.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the home cannot be created and
    /// `Error::Version` if detection fails.
    pub fn open(work_dir: impl Into<PathBuf>, settings: &Settings) -> Result<Self> {
        let home = SessionHome::create(work_dir, settings.temp_dir.as_deref())?;
        match settings.pinned_profile() {
            Some(profile) => Ok(home.bind(profile)),
            None => home.resolve(&settings.binary),
        }
    }

    /// Open a session with an explicit profile, skipping detection.
    pub fn with_profile(
        work_dir: impl Into<PathBuf>,
        profile: ToolProfile,
        temp_dir: Option<&Path>,
    ) -> Result<Self> {
        Ok(SessionHome::create(work_dir, temp_dir)?.bind(profile))
    }

    // --- Accessors ---
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> &ToolProfile {
        &self.profile
    }

    /// Private home, or `None` once closed.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_ref().map(TempDir::path)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Overrides applied to every child process.
    pub fn environment(&self) -> &ToolEnvironment {
        &self.env
    }

    // --- Operations ---
    /// Run the one-time client init on generations that need it.
    ///
    /// Returns empty output without running anything otherwise.
    pub fn init(&mut self) -> Result<String> {
        self.ensure_open()?;
        match command::init(&self.profile) {
            Some(args) => self.execute(&args, &Redactor::new()),
            None => Ok(String::new()),
        }
    }

    /// Register a chart repository.
    pub fn repo_add(&mut self, name: &str, url: &str, creds: &Credentials) -> Result<String> {
        self.ensure_open()?;
        let materialized = credentials::materialize(creds, &self.secret_naming)?;
        let args = command::repo_add(name, url, materialized.args());
        let result = self.execute(&args, &redactor_for(creds));
        materialized.release();
        result
    }

    /// Refresh the index of every registered repository.
    pub fn repo_update(&mut self) -> Result<String> {
        self.execute(&command::repo_update(), &Redactor::new())
    }

    /// Download a chart archive into `destination`.
    ///
    /// `destination` must already exist. An empty `version` fetches the latest.
    pub fn fetch(
        &mut self,
        repo: &str,
        chart: &str,
        version: &str,
        destination: &str,
        creds: &Credentials,
    ) -> Result<String> {
        self.ensure_open()?;
        let materialized = credentials::materialize(creds, &self.secret_naming)?;
        let args = command::fetch(
            &self.profile,
            repo,
            chart,
            version,
            destination,
            materialized.args(),
        );
        let result = self.execute(&args, &redactor_for(creds));
        materialized.release();
        result
    }

    /// Build the chart's dependencies in the working directory.
    pub fn dependency_build(&mut self) -> Result<String> {
        self.execute(&command::dependency_build(), &Redactor::new())
    }

    /// Print the default values of a chart.
    pub fn inspect_values(&mut self, values: &str) -> Result<String> {
        let args = command::inspect_values(&self.profile, values);
        self.execute(&args, &Redactor::new())
    }

    /// Render `chart_path` into manifests.
    pub fn template(&mut self, chart_path: &str, opts: &TemplateOptions) -> Result<String> {
        let args = command::template(&self.profile, chart_path, opts);
        self.execute(&args, &Redactor::new())
    }

    // --- Lifecycle ---
    /// Remove the home directory.
    ///
    /// Safe to call repeatedly, and tolerates the home having been removed
    /// by someone else.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;

        if let Some(home) = self.home.take() {
            let path = home.path().to_path_buf();
            match home.close() {
                Ok(()) => debug!(home = %path.display(), "removed session home"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(home = %path.display(), "session home already gone")
                }
                Err(e) => {
                    warn!(home = %path.display(), error = %e, "failed to remove session home")
                }
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    fn execute(&mut self, args: &[String], redactor: &Redactor) -> Result<String> {
        self.ensure_open()?;
        self.state = SessionState::Active;
        let result = runner::run(&self.profile, args, &self.work_dir, &self.env, redactor);
        self.state = SessionState::Resolved;
        result
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn redactor_for(creds: &Credentials) -> Redactor {
    Redactor::new().with_secret(&creds.password)
}
