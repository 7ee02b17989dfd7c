//! Credential redaction for command lines and captured output.
//!
//! Only `--username` and `--password` ever carry a literal secret on the
//! command line, so only the value following those two flags is masked.
//! Values passed through `--set` are left alone.

use std::sync::LazyLock;

use regex::Regex;
use zeroize::Zeroizing;

use crate::core::constants::REDACTION_MASK;

/// Matches `--username <value>`, `--password <value>` and the `=` forms.
///
/// The flag must be followed by spaces, tabs or `=`, so `--usernames` and
/// `--password-stdin` never match. The value is on the same line as the flag.
static CREDENTIAL_FLAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(--username|--password)([ \t]+|=)(\S+)").expect("credential flag regex is valid")
});

/// One whitespace-delimited token.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+").expect("token regex is valid"));

/// Masks credential values in text.
///
/// Besides the flag pattern, a redactor can be given literal secret values
/// (for example the password of the current operation). A literal is only
/// masked where it forms a whole token, optionally wrapped in quotes or
/// punctuation, such as when the tool echoes it back in an error message.
/// Text that merely contains the secret as a substring is left intact.
#[derive(Default, Clone)]
pub struct Redactor {
    literals: Vec<Zeroizing<String>>,
}

impl Redactor {
    /// Redactor that only masks flag values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also mask `secret` wherever it appears as a whole token. Empty strings
    /// are ignored.
    pub fn with_secret(mut self, secret: &str) -> Self {
        if !secret.is_empty() {
            self.literals.push(Zeroizing::new(secret.to_string()));
        }
        self
    }

    /// Return `text` with credential values replaced by the mask.
    pub fn redact(&self, text: &str) -> String {
        let masked = CREDENTIAL_FLAG_RE.replace_all(text, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], &caps[2], REDACTION_MASK)
        });

        if self.literals.is_empty() {
            return masked.into_owned();
        }
        TOKEN_RE
            .replace_all(&masked, |caps: &regex::Captures<'_>| self.mask_token(&caps[0]))
            .into_owned()
    }

    fn mask_token(&self, token: &str) -> String {
        if self.is_literal(token) {
            return REDACTION_MASK.to_string();
        }
        let start = token.len() - token.trim_start_matches(is_wrapper).len();
        let core = token[start..].trim_end_matches(is_wrapper);
        if core.is_empty() || !self.is_literal(core) {
            return token.to_string();
        }
        format!(
            "{}{}{}",
            &token[..start],
            REDACTION_MASK,
            &token[start + core.len()..]
        )
    }

    fn is_literal(&self, candidate: &str) -> bool {
        self.literals.iter().any(|l| l.as_str() == candidate)
    }

    /// Redact an argument list joined into a single loggable line.
    pub fn redact_args<S: AsRef<str>>(&self, program: &str, args: &[S]) -> String {
        let mut line = String::from(program);
        for arg in args {
            line.push(' ');
            line.push_str(arg.as_ref());
        }
        self.redact(&line)
    }
}

impl std::fmt::Debug for Redactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redactor")
            .field("literals", &self.literals.len())
            .finish()
    }
}

/// Quotes and punctuation that may surround an echoed secret.
fn is_wrapper(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '`' | '(' | ')' | '[' | ']' | '<' | '>' | ',' | ';' | ':' | '.'
    )
}

/// Redact `text` using only the flag pattern.
pub fn redact(text: &str) -> String {
    Redactor::new().redact(text)
}
