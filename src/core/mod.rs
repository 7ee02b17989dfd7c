//! Core library components.
//!
//! This module contains the version-aware command layer: profile
//! detection, credential handling, redaction, argument building, process
//! execution and the session that ties them together.

pub mod command;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod profile;
pub mod redact;
pub mod runner;
pub mod session;
pub mod types;
