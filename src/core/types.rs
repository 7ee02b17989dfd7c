//! Type aliases for domain concepts.

/// A release name passed to `template`.
pub type ReleaseName = String;

/// One `key=value` pair destined for a `--set*` flag.
pub type ValueKey = String;
