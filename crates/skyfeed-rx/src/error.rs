use skyfeed_frame::FrameError;

/// Fatal errors that abort the receive loop.
///
/// Per-message conditions (decryption misses, checksum mismatches, malformed
/// headers, failed saves) are not represented here — they are logged,
/// counted in [`RxStats`](crate::RxStats), and never abort the session.
#[derive(Debug, thiserror::Error)]
pub enum RxError {
    /// Framing was lost (delimiter mismatch) or the frame layer failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Reading from the input source failed.
    #[error("read from source failed: {0}")]
    Source(#[source] std::io::Error),

    /// The external decryptor could not be run at all.
    #[error("failed to run decryptor: {0}")]
    Decrypt(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RxError>;
