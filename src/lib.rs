//! Helmgate - run helm safely across versions.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── commands      # Command implementations
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── profile       # Generation detection and ToolProfile
//!     ├── credentials   # Credentials and transient secret files
//!     ├── redact        # Credential redaction
//!     ├── command       # Argument builders per operation
//!     ├── runner        # Child-process execution
//!     ├── session       # Session lifecycle and operations
//!     └── config        # Settings file
//! ```
//!
//! # Example
//!
//! ```no_run
//! use helmgate::core::command::TemplateOptions;
//! use helmgate::core::config::Settings;
//! use helmgate::core::session::Session;
//!
//! let mut session = Session::open("./my-chart", &Settings::default())?;
//! session.init()?;
//! let manifests = session.template(".", &TemplateOptions::new("my-release"))?;
//! session.close();
//! # let _ = manifests;
//! # Ok::<(), helmgate::error::Error>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
