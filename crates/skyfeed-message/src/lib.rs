//! Inner application message codec.
//!
//! Cooperating senders wrap their content in a fixed 260-byte header before
//! transmission:
//! - A 255-byte null-padded name (typically a file name)
//! - One reserved padding byte
//! - A 4-byte little-endian CRC32 (IEEE polynomial, zlib-compatible)
//!   computed over the payload
//!
//! This convention is application-level, not guaranteed by the transport:
//! any frame may carry content that doesn't follow it, so decode failures
//! are per-message conditions, never session-fatal.

pub mod codec;
pub mod error;

pub use codec::{decode_message, encode_message, Message, HEADER_LEN, NAME_FIELD_LEN};
pub use error::{MessageError, Result};
