//! Argument lists for each supported tool operation.
//!
//! These are pure functions: they take the session's [`ToolProfile`] plus
//! typed options and return the ordered arguments, without the program
//! name. Credential flags arrive already materialized.

use std::collections::BTreeMap;

use crate::core::profile::ToolProfile;
use crate::core::types::{ReleaseName, ValueKey};

/// Options for [`template`].
///
/// The maps are ordered so the same options always yield the same command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateOptions {
    pub release_name: ReleaseName,
    pub namespace: String,
    /// Target cluster version; dropped when the profile cannot pass it on.
    pub kube_version: String,
    pub api_versions: Vec<String>,
    pub set: BTreeMap<ValueKey, String>,
    pub set_string: BTreeMap<ValueKey, String>,
    pub set_file: BTreeMap<ValueKey, String>,
    /// Values files, in precedence order.
    pub values: Vec<String>,
}

impl TemplateOptions {
    pub fn new(release_name: impl Into<ReleaseName>) -> Self {
        Self {
            release_name: release_name.into(),
            ..Self::default()
        }
    }
}

/// Escape every comma in a `--set` value that is not already escaped.
///
/// The tool splits `--set` values on bare commas, so `a,b` becomes `a\,b`.
/// A comma already preceded by a backslash is left as is, which makes the
/// transform idempotent.
pub fn clean_set_parameter(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev = None;
    for ch in value.chars() {
        if ch == ',' && prev != Some('\\') {
            out.push('\\');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// `version --client --short`
pub fn version_query() -> Vec<String> {
    to_args(&["version", "--client", "--short"])
}

/// `init --client-only --skip-refresh`, or nothing when the profile has no init step.
pub fn init(profile: &ToolProfile) -> Option<Vec<String>> {
    profile
        .init_supported
        .then(|| to_args(&["init", "--client-only", "--skip-refresh"]))
}

/// `repo add <credential flags> <name> <url>`
pub fn repo_add(name: &str, url: &str, credential_args: &[String]) -> Vec<String> {
    let mut args = to_args(&["repo", "add"]);
    args.extend_from_slice(credential_args);
    args.push(name.to_string());
    args.push(url.to_string());
    args
}

/// `repo update`
pub fn repo_update() -> Vec<String> {
    to_args(&["repo", "update"])
}

/// `<pull> --destination <dir> [--version v] <credential flags> --repo <repo> <chart>`
///
/// An empty `version` fetches the latest chart.
pub fn fetch(
    profile: &ToolProfile,
    repo: &str,
    chart: &str,
    version: &str,
    destination: &str,
    credential_args: &[String],
) -> Vec<String> {
    let mut args = vec![
        profile.pull_command.clone(),
        "--destination".to_string(),
        destination.to_string(),
    ];
    if !version.is_empty() {
        args.push("--version".to_string());
        args.push(version.to_string());
    }
    args.extend_from_slice(credential_args);
    args.push("--repo".to_string());
    args.push(repo.to_string());
    args.push(chart.to_string());
    args
}

/// `dependency build`
pub fn dependency_build() -> Vec<String> {
    to_args(&["dependency", "build"])
}

/// `<show> values <chart>`
pub fn inspect_values(profile: &ToolProfile, values: &str) -> Vec<String> {
    vec![
        profile.show_command.clone(),
        "values".to_string(),
        values.to_string(),
    ]
}

/// `template <chart> <name arg> <release> [flags...]`
pub fn template(profile: &ToolProfile, chart_path: &str, opts: &TemplateOptions) -> Vec<String> {
    let mut args = vec![
        "template".to_string(),
        chart_path.to_string(),
        profile.template_name_arg.clone(),
        opts.release_name.clone(),
    ];

    if !opts.namespace.is_empty() {
        args.push("--namespace".to_string());
        args.push(opts.namespace.clone());
    }
    if !opts.kube_version.is_empty() && profile.kube_version_supported {
        args.push("--kube-version".to_string());
        args.push(opts.kube_version.clone());
    }
    push_set_flags(&mut args, "--set", &opts.set);
    push_set_flags(&mut args, "--set-string", &opts.set_string);
    push_set_flags(&mut args, "--set-file", &opts.set_file);
    for path in &opts.values {
        args.push("--values".to_string());
        args.push(path.clone());
    }
    for version in &opts.api_versions {
        args.push("--api-versions".to_string());
        args.push(version.clone());
    }

    args
}

fn push_set_flags(args: &mut Vec<String>, flag: &str, values: &BTreeMap<ValueKey, String>) {
    for (key, value) in values {
        args.push(flag.to_string());
        args.push(format!("{}={}", key, clean_set_parameter(value)));
    }
}

fn to_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
