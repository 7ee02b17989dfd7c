//! Repository credentials and their materialization into tool flags.
//!
//! Username and password travel as inline flag values. The CA path is
//! passed through untouched. Client certificate and key bytes are written
//! to transient files which live exactly as long as the returned
//! [`MaterializedCredentials`].

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{trace, warn};
use zeroize::Zeroizing;

use crate::core::constants::TEMP_PREFIX;
use crate::error::{CredentialError, Result};

/// Credentials for a chart repository.
///
/// Every field is optional. A client certificate is only useful together
/// with its key; that pairing is left for the tool to reject.
#[derive(Default, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Zeroizing<String>,
    /// Path to a CA bundle already on disk.
    pub ca_path: Option<PathBuf>,
    pub cert_data: Zeroizing<Vec<u8>>,
    pub key_data: Zeroizing<Vec<u8>>,
}

impl Credentials {
    /// Credentials with only a username and password.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
            ..Self::default()
        }
    }

    /// Attach a CA bundle path.
    pub fn with_ca_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_path = Some(path.into());
        self
    }

    /// Attach client certificate and key material.
    pub fn with_client_cert(mut self, cert: Vec<u8>, key: Vec<u8>) -> Self {
        self.cert_data = Zeroizing::new(cert);
        self.key_data = Zeroizing::new(key);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
            && self.password.is_empty()
            && self.ca_path.is_none()
            && self.cert_data.is_empty()
            && self.key_data.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("ca_path", &self.ca_path)
            .field("cert_data", &self.cert_data.len())
            .field("key_data", &self.key_data.len())
            .finish()
    }
}

/// Where transient secret files are created and how they are named.
#[derive(Debug, Clone)]
pub struct SecretFileNaming {
    /// Directory for the files. `None` uses the system temp directory.
    pub dir: Option<PathBuf>,
    /// File name prefix; a random suffix keeps names process-unique.
    pub prefix: String,
}

impl Default for SecretFileNaming {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: TEMP_PREFIX.to_string(),
        }
    }
}

impl SecretFileNaming {
    /// Create secret files inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    fn create(&self, kind: &'static str) -> Result<NamedTempFile> {
        let suffix = format!(".{}", kind);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.prefix).suffix(&suffix);
        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        Ok(file.map_err(|source| CredentialError::TempFile { kind, source })?)
    }
}

/// A temp file holding one secret, removed when dropped.
///
/// `tempfile` creates the file with mode 0600 on unix.
pub struct TransientFile {
    kind: &'static str,
    inner: Option<NamedTempFile>,
}

impl TransientFile {
    /// Write `data` to a fresh file named according to `naming`.
    ///
    /// A file that was created but could not be written is removed before
    /// the error is returned.
    pub fn write(naming: &SecretFileNaming, kind: &'static str, data: &[u8]) -> Result<Self> {
        let mut file = naming.create(kind)?;
        // NamedTempFile unlinks itself on drop, covering the error path.
        file.write_all(data)
            .and_then(|_| file.flush())
            .map_err(|source| CredentialError::Write { kind, source })?;
        trace!(kind, bytes = data.len(), path = %file.path().display(), "wrote transient secret");
        Ok(Self {
            kind,
            inner: Some(file),
        })
    }

    /// Path referenced by the tool flag.
    pub fn path(&self) -> &Path {
        self.inner
            .as_ref()
            .map(NamedTempFile::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Remove the file now, logging (not returning) any failure.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(file) = self.inner.take() {
            let path = file.path().to_path_buf();
            if let Err(e) = file.close() {
                warn!(kind = self.kind, path = %path.display(), error = %e, "failed to remove transient secret file");
            }
        }
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        self.remove();
    }
}

impl fmt::Debug for TransientFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientFile")
            .field("kind", &self.kind)
            .field("path", &self.path())
            .finish()
    }
}

/// Flag fragments for one operation plus the files they reference.
///
/// The files are removed when this value is dropped, so it must outlive
/// the child process that reads them.
#[derive(Debug, Default)]
pub struct MaterializedCredentials {
    args: Vec<String>,
    files: Vec<TransientFile>,
}

impl MaterializedCredentials {
    /// Flags to splice into the command, in a fixed order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Paths of the transient files backing `--cert-file`/`--key-file`.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path().to_path_buf()).collect()
    }

    /// Remove every transient file now.
    pub fn release(self) {
        for file in self.files {
            file.release();
        }
    }
}

/// Turn `creds` into flag fragments and transient files.
///
/// Flags come out as `--username`, `--password`, `--ca-file`,
/// `--cert-file`, `--key-file`, each only when set.
pub fn materialize(creds: &Credentials, naming: &SecretFileNaming) -> Result<MaterializedCredentials> {
    let mut out = MaterializedCredentials::default();

    if !creds.username.is_empty() {
        out.args.push("--username".to_string());
        out.args.push(creds.username.clone());
    }
    if !creds.password.is_empty() {
        out.args.push("--password".to_string());
        out.args.push(creds.password.to_string());
    }
    if let Some(ca) = &creds.ca_path {
        out.args.push("--ca-file".to_string());
        out.args.push(ca.display().to_string());
    }
    if !creds.cert_data.is_empty() {
        // On error `out` drops here and takes any earlier file with it.
        let file = TransientFile::write(naming, "cert", &creds.cert_data)?;
        out.args.push("--cert-file".to_string());
        out.args.push(file.path().display().to_string());
        out.files.push(file);
    }
    if !creds.key_data.is_empty() {
        let file = TransientFile::write(naming, "key", &creds.key_data)?;
        out.args.push("--key-file".to_string());
        out.args.push(file.path().display().to_string());
        out.files.push(file);
    }

    Ok(out)
}
