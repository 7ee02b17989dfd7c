//! Fake tool script.
//!
//! The script answers `version` with a fixed line and echoes everything
//! else it receives: arguments, working directory, the four home overrides
//! and the contents of any `--cert-file`/`--key-file`.

use std::path::{Path, PathBuf};

/// helm 2 style `version --client --short` output.
pub const LEGACY_VERSION: &str = "Client: v2.16.1+gbbdfe5e";

/// helm 3 style `version --short` output.
pub const MODERN_VERSION: &str = "v3.2.0+ge11b7ce";

/// Builder for the fake tool script.
pub struct FakeTool {
    version_line: String,
    exit_code: Option<i32>,
}

impl FakeTool {
    pub fn new(version_line: &str) -> Self {
        Self {
            version_line: version_line.to_string(),
            exit_code: None,
        }
    }

    /// Exit with `code` after echoing, for every non-version command.
    pub fn failing(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    fn script(&self) -> String {
        let tail = match self.exit_code {
            Some(code) => format!("echo \"Error: request failed\" >&2\nexit {}\n", code),
            None => "exit 0\n".to_string(),
        };
        format!(
            r#"#!/bin/sh
if [ "$1" = "version" ]; then
  echo "{version}"
  exit 0
fi
printf 'args: %s\n' "$*"
echo "pwd: $(pwd)"
echo "HELM_HOME=$HELM_HOME"
echo "XDG_CACHE_HOME=$XDG_CACHE_HOME"
echo "XDG_CONFIG_HOME=$XDG_CONFIG_HOME"
echo "XDG_DATA_HOME=$XDG_DATA_HOME"
prev=""
for a in "$@"; do
  case "$prev" in
    --cert-file|--key-file)
      printf 'secret-file: %s\n' "$a"
      echo "secret-content: $(cat "$a")"
      ;;
  esac
  prev="$a"
done
{tail}"#,
            version = self.version_line,
            tail = tail
        )
    }

    /// Write the script into `dir` as `helm` and make it executable.
    pub fn install(&self, dir: &Path) -> PathBuf {
        let path = dir.join("helm");
        std::fs::write(&path, self.script()).expect("failed to write fake tool");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("failed to chmod fake tool");
        }

        path
    }
}

/// Value of the first `<prefix><value>` line in tool output.
pub fn line_value<'a>(output: &'a str, prefix: &str) -> Option<&'a str> {
    output.lines().find_map(|l| l.strip_prefix(prefix))
}

/// Every `<prefix><value>` line in tool output.
pub fn line_values<'a>(output: &'a str, prefix: &str) -> Vec<&'a str> {
    output.lines().filter_map(|l| l.strip_prefix(prefix)).collect()
}
