use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::error::{Result, RxError};

/// Outcome of a decryption attempt.
///
/// Most frames on a shared broadcast pipe are addressed to somebody else, so
/// `NotForUs` is an expected, non-error outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decryption {
    /// The ciphertext was decryptable by the local identity.
    Plaintext(Vec<u8>),
    /// The message is not addressed to this identity.
    NotForUs,
}

/// The decryption seam of the pipeline.
///
/// Implementations treat ciphertext as opaque; a failed decryption is a
/// miss, not an error. Only the inability to run the decryptor at all is
/// reported as [`RxError::Decrypt`].
pub trait Decryptor {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Decryption>;
}

/// Decrypts by shelling out to the GnuPG binary.
///
/// Key management and cryptographic internals stay inside gpg; this adapter
/// only moves bytes. A non-zero exit status or empty output means the
/// ciphertext was not for one of our keys.
pub struct GpgDecryptor {
    gnupghome: PathBuf,
    program: PathBuf,
}

impl GpgDecryptor {
    /// Default GnuPG binary name, resolved via `PATH`.
    pub const DEFAULT_PROGRAM: &'static str = "gpg";

    /// Create a decryptor using the given GnuPG home directory.
    pub fn new(gnupghome: impl Into<PathBuf>) -> Self {
        Self {
            gnupghome: gnupghome.into(),
            program: PathBuf::from(Self::DEFAULT_PROGRAM),
        }
    }

    /// Override the binary to invoke (used by tests and doctor checks).
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// The configured GnuPG home directory.
    pub fn gnupghome(&self) -> &Path {
        &self.gnupghome
    }
}

impl Decryptor for GpgDecryptor {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Decryption> {
        let mut child = Command::new(&self.program)
            .arg("--homedir")
            .arg(&self.gnupghome)
            .args(["--batch", "--quiet", "--decrypt"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(RxError::Decrypt)?;

        // Feed stdin from a separate thread while the main thread drains
        // stdout, so neither pipe can fill up and deadlock the child.
        let writer = child.stdin.take().map(|mut stdin| {
            let data = ciphertext.to_vec();
            std::thread::spawn(move || {
                // The child may exit before consuming all input (e.g. on
                // garbage ciphertext); that shows up in its exit status.
                let _ = stdin.write_all(&data);
            })
        });

        let output = child.wait_with_output().map_err(RxError::Decrypt)?;
        if let Some(handle) = writer {
            let _ = handle.join();
        }

        if output.status.success() && !output.stdout.is_empty() {
            debug!(
                ciphertext_bytes = ciphertext.len(),
                plaintext_bytes = output.stdout.len(),
                "decryption ok"
            );
            Ok(Decryption::Plaintext(output.stdout))
        } else {
            trace!(status = ?output.status, "decryption failed, message not for us");
            Ok(Decryption::NotForUs)
        }
    }
}

/// No-op decryptor for pipes declared to carry only plaintext transmissions.
pub struct PassthroughDecryptor;

impl Decryptor for PassthroughDecryptor {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Decryption> {
        Ok(Decryption::Plaintext(ciphertext.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A gpg stand-in: a shell script that ignores the decrypt flags and
    /// echoes stdin. Returns the tempdir so the script outlives the call.
    #[cfg(unix)]
    fn echo_stub() -> (tempfile::TempDir, GpgDecryptor) {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-gpg");
        std::fs::write(&script, "#!/bin/sh\nexec cat\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let decryptor = GpgDecryptor::new(".gnupg").with_program(&script);
        (dir, decryptor)
    }

    #[test]
    fn passthrough_returns_input() {
        let result = PassthroughDecryptor.decrypt(b"already plain").unwrap();
        assert_eq!(result, Decryption::Plaintext(b"already plain".to_vec()));
    }

    #[test]
    #[cfg(unix)]
    fn successful_child_output_is_plaintext() {
        // Plain `cat` won't do here: it would choke on the --decrypt
        // arguments and exit non-zero, turning success into a miss.
        let (_dir, decryptor) = echo_stub();
        let result = decryptor.decrypt(b"echoed bytes").unwrap();
        assert_eq!(result, Decryption::Plaintext(b"echoed bytes".to_vec()));
    }

    #[test]
    #[cfg(unix)]
    fn failing_child_is_a_miss() {
        let decryptor = GpgDecryptor::new(".gnupg").with_program("false");
        let result = decryptor.decrypt(b"whatever").unwrap();
        assert_eq!(result, Decryption::NotForUs);
    }

    #[test]
    #[cfg(unix)]
    fn empty_output_is_a_miss() {
        let decryptor = GpgDecryptor::new(".gnupg").with_program("true");
        let result = decryptor.decrypt(b"whatever").unwrap();
        assert_eq!(result, Decryption::NotForUs);
    }

    #[test]
    fn missing_binary_is_fatal() {
        let decryptor =
            GpgDecryptor::new(".gnupg").with_program("/nonexistent/skyfeed-test-gpg");
        let err = decryptor.decrypt(b"x").unwrap_err();
        assert!(matches!(err, RxError::Decrypt(_)));
    }

    #[test]
    fn gnupghome_accessor() {
        let decryptor = GpgDecryptor::new("/home/user/.gnupg");
        assert_eq!(decryptor.gnupghome(), Path::new("/home/user/.gnupg"));
    }
}
