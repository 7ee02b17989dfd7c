//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::credentials::Credentials;
use crate::core::profile::Generation;
use crate::error::Result;

/// helmgate - run helm safely across versions.
#[derive(Parser)]
#[command(
    name = "helmgate",
    about = "Run helm with isolated state and redacted credentials",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to <config dir>/helmgate/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// helm executable to run
    #[arg(long, global = true, env = "HELMGATE_BINARY")]
    pub binary: Option<String>,

    /// Skip version detection and assume this generation
    #[arg(long, global = true, value_enum)]
    pub generation: Option<Generation>,

    /// Working directory for helm (usually a chart directory)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub workdir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Detect the installed helm and show its profile
    Version {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a chart repository
    RepoAdd {
        /// Repository name
        name: String,
        /// Repository URL
        url: String,
        #[command(flatten)]
        creds: CredentialArgs,
    },

    /// Update repository indexes
    RepoUpdate,

    /// Download a chart archive
    Fetch {
        /// Repository URL
        repo: String,
        /// Chart name
        chart: String,
        /// Existing directory to download into
        #[arg(short, long)]
        destination: String,
        /// Chart version (latest when omitted)
        #[arg(long, default_value = "")]
        version: String,
        #[command(flatten)]
        creds: CredentialArgs,
    },

    /// Build chart dependencies in the working directory
    DependencyBuild,

    /// Show a chart's default values
    Values {
        /// Chart reference or path
        chart: String,
    },

    /// Render chart templates
    Template {
        /// Path to the chart directory
        chart: String,
        #[command(flatten)]
        opts: TemplateArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Repository credential flags.
#[derive(Args, Debug, Default)]
pub struct CredentialArgs {
    /// Repository username
    #[arg(long)]
    pub username: Option<String>,

    /// Repository password
    #[arg(long, env = "HELMGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// CA bundle used to verify the repository
    #[arg(long)]
    pub ca_file: Option<PathBuf>,

    /// Client certificate (PEM)
    #[arg(long)]
    pub cert_file: Option<PathBuf>,

    /// Client key (PEM)
    #[arg(long)]
    pub key_file: Option<PathBuf>,
}

impl CredentialArgs {
    /// Read certificate and key material into memory.
    ///
    /// The child never sees these paths; it gets transient copies.
    pub fn load(&self) -> Result<Credentials> {
        let mut creds = Credentials::basic(
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        );
        creds.ca_path = self.ca_file.clone();
        if let Some(path) = &self.cert_file {
            creds.cert_data = std::fs::read(path)?.into();
        }
        if let Some(path) = &self.key_file {
            creds.key_data = std::fs::read(path)?.into();
        }
        Ok(creds)
    }
}

/// Flags for `template`.
#[derive(Args, Debug, Default)]
pub struct TemplateArgs {
    /// Release name
    #[arg(long, default_value = "release")]
    pub release: String,

    /// Namespace for the release
    #[arg(short, long, default_value = "")]
    pub namespace: String,

    /// Target Kubernetes version (ignored by helm 3)
    #[arg(long, default_value = "")]
    pub kube_version: String,

    /// Set a value (key=value), repeatable
    #[arg(long = "set", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Set a string value (key=value), repeatable
    #[arg(long = "set-string", value_parser = parse_key_val)]
    pub set_string: Vec<(String, String)>,

    /// Set a value from a file (key=path), repeatable
    #[arg(long = "set-file", value_parser = parse_key_val)]
    pub set_file: Vec<(String, String)>,

    /// Values file, repeatable
    #[arg(short = 'f', long = "values")]
    pub values: Vec<String>,

    /// Kubernetes API versions available for capability checks, repeatable
    #[arg(short = 'a', long = "api-versions")]
    pub api_versions: Vec<String>,
}

/// Parse `key=value`, splitting on the first `=`.
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    commands::execute(cli)
}
