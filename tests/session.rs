//! Session integration tests against a fake tool.
//!
//! These cover what only shows up once a real child process runs:
//! environment isolation, transient secret files, redaction of captured
//! output and version detection.

#![cfg(unix)]

mod support;

use helmgate::core::command::TemplateOptions;
use helmgate::core::config::Settings;
use helmgate::core::credentials::Credentials;
use helmgate::core::profile::{Generation, ToolProfile};
use helmgate::core::session::{Session, SessionState};
use helmgate::error::{Error, VersionError};
use serial_test::serial;
use support::*;

// ============================================================================
// Version detection
// ============================================================================

fn settings_for(t: &Test) -> Settings {
    Settings {
        binary: t.tool_str(),
        generation: None,
        temp_dir: Some(t.tmp.path().to_path_buf()),
    }
}

#[test]
#[serial]
fn test_detects_legacy_generation() {
    let t = Test::new(LEGACY_VERSION);
    let session = Session::open(t.dir.path(), &settings_for(&t)).unwrap();
    assert_eq!(session.profile().generation, Generation::Legacy);
    assert_eq!(session.profile().binary_name, t.tool_str());
    assert_eq!(session.profile().pull_command, "fetch");
}

#[test]
#[serial]
fn test_detects_modern_generation() {
    let t = Test::new(MODERN_VERSION);
    let session = Session::open(t.dir.path(), &settings_for(&t)).unwrap();
    assert_eq!(session.profile().generation, Generation::Modern);
    assert_eq!(session.profile().template_name_arg, "--name-template");
}

#[test]
#[serial]
fn test_unknown_major_version_fails() {
    let t = Test::new("v4.0.1");
    let err = Session::open(t.dir.path(), &settings_for(&t)).unwrap_err();
    assert!(matches!(err, Error::Version(VersionError::Unsupported { .. })));
    // The home allocated for detection is gone again.
    assert!(t.tmp_entries().is_empty());
}

#[test]
#[serial]
fn test_unparseable_version_fails() {
    let t = Test::new("helm version unknown");
    let err = Session::open(t.dir.path(), &settings_for(&t)).unwrap_err();
    assert!(matches!(err, Error::Version(VersionError::Unparseable { .. })));
}

#[test]
#[serial]
fn test_pinned_generation_skips_detection() {
    // The fake would report an unsupported version if asked.
    let t = Test::new("v9.9.9");
    let settings = Settings {
        generation: Some(Generation::Legacy),
        ..settings_for(&t)
    };
    let session = Session::open(t.dir.path(), &settings).unwrap();
    assert_eq!(session.profile().generation, Generation::Legacy);
    assert_eq!(session.profile().binary_name, t.tool_str());
}

// ============================================================================
// Environment isolation
// ============================================================================

#[test]
#[serial]
fn test_child_runs_in_workdir_with_isolated_home() {
    let t = Test::new(MODERN_VERSION);
    let mut session = t.session(ToolProfile::modern());
    let home = session.home().unwrap().to_path_buf();

    let out = session.dependency_build().unwrap();

    assert_eq!(line_value(&out, "args: "), Some("dependency build"));
    let pwd = std::path::PathBuf::from(line_value(&out, "pwd: ").unwrap());
    assert_eq!(
        pwd.canonicalize().unwrap(),
        t.dir.path().canonicalize().unwrap()
    );
    let home_str = home.display().to_string();
    assert_eq!(line_value(&out, "HELM_HOME="), Some(home_str.as_str()));
    assert_eq!(
        line_value(&out, "XDG_CACHE_HOME="),
        Some(format!("{}/cache", home_str).as_str())
    );
    assert_eq!(
        line_value(&out, "XDG_CONFIG_HOME="),
        Some(format!("{}/config", home_str).as_str())
    );
    assert_eq!(
        line_value(&out, "XDG_DATA_HOME="),
        Some(format!("{}/data", home_str).as_str())
    );
}

#[test]
#[serial]
fn test_concurrent_sessions_have_distinct_homes() {
    let t = Test::new(MODERN_VERSION);
    let a = t.session(ToolProfile::modern());
    let b = t.session(ToolProfile::modern());
    assert_ne!(a.home(), b.home());

    let tool = t.tool_str();
    let dir = t.dir.path().to_path_buf();
    let tmp = t.tmp.path().to_path_buf();
    let handles: Vec<_> = (0..3)
        .map(|_| {
            let tool = tool.clone();
            let dir = dir.clone();
            let tmp = tmp.clone();
            std::thread::spawn(move || {
                let mut s = Session::with_profile(
                    dir,
                    ToolProfile::modern().with_binary(tool),
                    Some(tmp.as_path()),
                )
                .unwrap();
                let out = s.repo_update().unwrap();
                let home = line_value(&out, "HELM_HOME=").unwrap().to_string();
                s.close();
                home
            })
        })
        .collect();

    let mut homes: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    homes.sort();
    homes.dedup();
    assert_eq!(homes.len(), 3);
}

// ============================================================================
// Operations
// ============================================================================

#[test]
#[serial]
fn test_legacy_init_runs_client_only() {
    let t = Test::new(LEGACY_VERSION);
    let mut session = t.session(ToolProfile::legacy());
    let out = session.init().unwrap();
    assert_eq!(
        line_value(&out, "args: "),
        Some("init --client-only --skip-refresh")
    );
    assert_eq!(session.state(), SessionState::Resolved);
}

#[test]
#[serial]
fn test_inspect_values_per_generation() {
    let t = Test::new(LEGACY_VERSION);
    let mut legacy = t.session(ToolProfile::legacy());
    let mut modern = t.session(ToolProfile::modern());

    let out = legacy.inspect_values("stable/nginx").unwrap();
    assert_eq!(line_value(&out, "args: "), Some("inspect values stable/nginx"));

    let out = modern.inspect_values("stable/nginx").unwrap();
    assert_eq!(line_value(&out, "args: "), Some("show values stable/nginx"));
}

#[test]
#[serial]
fn test_template_escapes_commas() {
    let t = Test::new(MODERN_VERSION);
    let mut session = t.session(ToolProfile::modern());
    let mut opts = TemplateOptions::new("web");
    opts.set
        .insert("hosts".to_string(), "a.example.com,b.example.com".to_string());

    let out = session.template(".", &opts).unwrap();
    assert_eq!(
        line_value(&out, "args: "),
        Some(r"template . --name-template web --set hosts=a.example.com\,b.example.com")
    );
}

#[test]
#[serial]
fn test_fetch_passes_version_and_repo() {
    let t = Test::new(MODERN_VERSION);
    let mut session = t.session(ToolProfile::modern());
    let dest = t.dir.path().display().to_string();

    let out = session
        .fetch(
            "https://charts.example.com",
            "nginx",
            "1.2.3",
            &dest,
            &Credentials::default(),
        )
        .unwrap();
    assert_eq!(
        line_value(&out, "args: "),
        Some(
            format!(
                "pull --destination {} --version 1.2.3 --repo https://charts.example.com nginx",
                dest
            )
            .as_str()
        )
    );
}

// ============================================================================
// Credentials
// ============================================================================

#[test]
#[serial]
fn test_repo_add_redacts_username_and_password() {
    let t = Test::new(MODERN_VERSION);
    let mut session = t.session(ToolProfile::modern());

    let out = session
        .repo_add(
            "myrepo",
            "https://example.com",
            &Credentials::basic("alice", "hunter2"),
        )
        .unwrap();

    assert_eq!(
        line_value(&out, "args: "),
        Some("repo add --username ****** --password ****** myrepo https://example.com")
    );
    assert_absent(&out, "alice");
    assert_absent(&out, "hunter2");
}

#[test]
#[serial]
fn test_short_password_leaves_unrelated_output_intact() {
    let t = Test::new(MODERN_VERSION);
    let mut session = t.session(ToolProfile::modern());

    let out = session
        .repo_add("myrepo", "https://example.com", &Credentials::basic("u", "p"))
        .unwrap();

    assert_eq!(
        line_value(&out, "args: "),
        Some("repo add --username ****** --password ****** myrepo https://example.com")
    );
    let pwd = std::path::PathBuf::from(line_value(&out, "pwd: ").unwrap());
    assert_eq!(
        pwd.canonicalize().unwrap(),
        t.dir.path().canonicalize().unwrap()
    );
    assert!(!out.contains("myre******o"));
}

#[test]
#[serial]
fn test_secret_files_visible_to_tool_then_removed() {
    let t = Test::new(MODERN_VERSION);
    let mut session = t.session(ToolProfile::modern());
    let creds = Credentials::default().with_client_cert(b"CERTDATA".to_vec(), b"KEYDATA".to_vec());

    let out = session.repo_add("r", "https://example.com", &creds).unwrap();

    let files = line_values(&out, "secret-file: ");
    assert_eq!(files.len(), 2);
    assert_eq!(
        line_values(&out, "secret-content: "),
        vec!["CERTDATA", "KEYDATA"]
    );
    for file in files {
        assert!(
            !std::path::Path::new(file).exists(),
            "{} survived the call",
            file
        );
    }
    // Only the session home remains in the temp parent.
    assert_eq!(t.tmp_entries(), vec![session.home().unwrap().to_path_buf()]);
}

#[test]
#[serial]
fn test_secret_files_removed_when_tool_fails() {
    let t = Test::failing(MODERN_VERSION, 2);
    let mut session = t.session(ToolProfile::modern());
    let creds = Credentials::basic("ci-robot-user", "pa55word")
        .with_client_cert(b"CERTDATA".to_vec(), b"KEYDATA".to_vec());

    let (code, output) = expect_tool_failure(session.fetch(
        "https://example.com",
        "nginx",
        "",
        ".",
        &creds,
    ));

    assert_eq!(code, Some(2));
    assert!(output.contains("Error: request failed"));
    assert_absent(&output, "pa55word");
    assert_absent(&output, "ci-robot-user");
    for file in line_values(&output, "secret-file: ") {
        assert!(!std::path::Path::new(file).exists());
    }
    assert_eq!(t.tmp_entries(), vec![session.home().unwrap().to_path_buf()]);
    assert_eq!(session.state(), SessionState::Resolved);
}

#[test]
#[serial]
fn test_failed_error_message_is_redacted() {
    let t = Test::failing(MODERN_VERSION, 1);
    let mut session = t.session(ToolProfile::modern());
    let err = session
        .repo_add("r", "https://x", &Credentials::basic("u", "topsecret"))
        .unwrap_err();
    assert_absent(&err.to_string(), "topsecret");
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
#[serial]
fn test_close_then_operate_fails() {
    let t = Test::new(MODERN_VERSION);
    let mut session = t.session(ToolProfile::modern());
    session.close();
    session.close();
    assert!(matches!(session.dependency_build(), Err(Error::SessionClosed)));
    assert!(t.tmp_entries().is_empty());
}
