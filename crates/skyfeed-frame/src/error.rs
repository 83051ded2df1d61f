/// Errors that can occur while reassembling outer frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The bytes at the start of the buffer are not the frame delimiter.
    ///
    /// The delimiter is generated by the receiver process and cannot be lost
    /// in transit, so a mismatch means framing is gone for good. There is no
    /// safe resynchronization point; the session must be abandoned.
    #[error("stream desynchronized: frame delimiter not found")]
    DelimiterMismatch,

    /// An I/O error occurred while reading from the stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source closed before a complete frame was received.
    #[error("source closed (incomplete frame)")]
    SourceClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
