//! Helmgate - run helm safely across versions.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use helmgate::cli::output;
use helmgate::cli::{execute, Cli};
use helmgate::error::{Error, ExecutionError, VersionError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("HELMGATE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("helmgate=debug")
        } else {
            EnvFilter::new("helmgate=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Version(VersionError::NotInstalled { .. }) => {
                Some("install helm or pass --binary / set HELMGATE_BINARY")
            }
            Error::Version(VersionError::Unsupported { .. })
            | Error::Version(VersionError::Unparseable { .. }) => {
                Some("pin the generation with --generation legacy|modern")
            }
            Error::Config(_) => Some("check the settings file or pass --config"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }

        // Mirror the tool's own status when it ran and failed.
        let code = match &e {
            Error::Execution(ExecutionError::Failed {
                exit_code: Some(code),
                ..
            }) => *code,
            _ => 1,
        };
        std::process::exit(code);
    }
}
