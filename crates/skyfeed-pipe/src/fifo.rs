use std::ffi::CString;
use std::fs::File;
use std::io::Read;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PipeError, Result};

/// A named pipe (FIFO) opened for reading.
///
/// Opening blocks until a writer attaches, which is the expected
/// waiting-for-data state for a consumer of the broadcast receiver's output.
pub struct Pipe {
    file: File,
    path: PathBuf,
}

impl Pipe {
    /// Default permission mode for created FIFOs.
    pub const DEFAULT_PIPE_MODE: u32 = 0o600;

    /// Open the FIFO at `path` for reading, creating it if absent.
    ///
    /// If the path exists but is not a FIFO it is never touched; the open is
    /// refused instead.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_mode(path, Self::DEFAULT_PIPE_MODE)
    }

    /// Open the FIFO at `path` for reading, creating it with `mode` if absent.
    pub fn open_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if path.exists() {
            let metadata = std::fs::symlink_metadata(&path).map_err(|e| PipeError::Open {
                path: path.clone(),
                source: e,
            })?;
            if !metadata.file_type().is_fifo() {
                return Err(PipeError::NotAPipe { path });
            }
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| PipeError::Create {
                        path: path.clone(),
                        source: e,
                    })?;
                }
            }
            mkfifo(&path, mode)?;
            debug!(?path, mode, "created fifo");
        }

        // Blocks until a writer opens the other end.
        let file = File::open(&path).map_err(|e| PipeError::Open {
            path: path.clone(),
            source: e,
        })?;
        info!(?path, "pipe open for reading");

        Ok(Self { file, path })
    }

    /// The filesystem path of this pipe.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for Pipe {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl std::fmt::Debug for Pipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipe").field("path", &self.path).finish()
    }
}

fn mkfifo(path: &Path, mode: u32) -> Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| PipeError::Create {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path contains an interior NUL byte",
        ),
    })?;

    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of
    // the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        // Lost the creation race; the winner's FIFO is as good as ours.
        if err.kind() != std::io::ErrorKind::AlreadyExists {
            return Err(PipeError::Create {
                path: path.to_path_buf(),
                source: err,
            });
        }
    }
    Ok(())
}
