//! Test assertion helpers.

use std::process::Output;

use helmgate::error::{Error, ExecutionError};

/// Get stdout as String.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Get stderr as String.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Unwrap a tool failure into its exit code and redacted output.
pub fn expect_tool_failure<T: std::fmt::Debug>(result: Result<T, Error>) -> (Option<i32>, String) {
    match result {
        Err(Error::Execution(ExecutionError::Failed {
            exit_code, output, ..
        })) => (exit_code, output),
        other => panic!("expected tool failure, got {:?}", other),
    }
}

/// Assert `text` does not contain `needle`, printing the text on failure.
pub fn assert_absent(text: &str, needle: &str) {
    assert!(
        !text.contains(needle),
        "'{}' leaked into output:\n{}",
        needle,
        text
    );
}
