/// Errors that can occur while encoding or decoding inner messages.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The input is shorter than the fixed message header.
    #[error("message too short for header ({len} bytes, need 260)")]
    Truncated { len: usize },

    /// The payload checksum disagrees with the header value.
    #[error("checksum mismatch (header {expected}, computed {actual}, {size} payload bytes)")]
    ChecksumMismatch {
        expected: u32,
        actual: u32,
        size: usize,
    },

    /// The name does not fit in the fixed-capacity name field.
    #[error("name too long ({len} bytes, max 255)")]
    NameTooLong { len: usize },
}

pub type Result<T> = std::result::Result<T, MessageError>;
