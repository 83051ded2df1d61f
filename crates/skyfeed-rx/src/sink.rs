use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// Errors that can occur while persisting a message.
///
/// Sink failures are per-message conditions in the receive loop; the loop
/// logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The destination directory could not be created.
    #[error("failed to create download directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The sender-supplied name would escape the download directory.
    #[error("unsafe message name rejected: {name:?}")]
    UnsafeName { name: String },
}

/// Persists message payloads under a destination directory.
pub struct DownloadSink {
    dir: PathBuf,
}

impl DownloadSink {
    /// Create a sink rooted at `dir`. The directory is created lazily on the
    /// first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The destination directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` under `name`, or under a generated timestamp name.
    ///
    /// An explicit name that already exists is overwritten — the sender
    /// chose the name and a re-send is a replacement. Generated names are
    /// disambiguated with a counter suffix instead, so two messages arriving
    /// within the same second never clobber each other.
    pub fn save(&self, data: &[u8], name: Option<&str>) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SinkError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = match name {
            Some(name) => {
                validate_name(name)?;
                self.dir.join(name)
            }
            None => self.generated_path(),
        };

        std::fs::write(&path, data).map_err(|e| SinkError::Write {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), bytes = data.len(), "saved message");

        Ok(path)
    }

    fn generated_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
        let mut path = self.dir.join(&stamp);
        let mut n = 1u32;
        while path.exists() {
            path = self.dir.join(format!("{stamp}-{n}"));
            n += 1;
        }
        path
    }
}

/// Reject names that would resolve outside the download directory.
///
/// Names come from the sender-controlled message header, so absolute paths,
/// parent components, and separators are all refused rather than sanitized.
fn validate_name(name: &str) -> Result<(), SinkError> {
    let unsafe_name = || SinkError::UnsafeName {
        name: name.to_string(),
    };

    if name.is_empty() {
        return Err(unsafe_name());
    }

    let path = Path::new(name);
    if path.is_absolute() {
        return Err(unsafe_name());
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(unsafe_name()),
    }
}
