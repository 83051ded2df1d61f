use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Length of the synchronization delimiter.
pub const DELIMITER_LEN: usize = 32;

/// Frame header: delimiter (32) + payload length (8) = 40 bytes.
pub const HEADER_SIZE: usize = DELIMITER_LEN + 8;

/// Synchronization delimiter written by the broadcast receiver before every
/// transmission. Shared by all producers and consumers of the pipe.
pub const DELIMITER: [u8; DELIMITER_LEN] = *b"vyqzbefrsnzqahgdkrsidzigxvrppato";

/// Configuration for the outer frame codec.
///
/// The delimiter is carried here rather than read from a module global so
/// that the value in force is always explicit at the accumulator boundary.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Delimiter expected at the start of every frame header.
    pub delimiter: [u8; DELIMITER_LEN],
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            delimiter: DELIMITER,
        }
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────┬──────────────────┐
/// │ Delimiter (32B)  │ Length       │ Payload          │
/// │ fixed constant   │ (8B LE u64)  │ (Length bytes)   │
/// └──────────────────┴──────────────┴──────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut, config: &FrameConfig) {
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&config.delimiter);
    dst.put_u64_le(payload.len() as u64);
    dst.put_slice(payload);
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet; in
/// that case nothing is consumed. On success, consumes header and payload
/// from the front of the buffer and returns the payload.
///
/// The length field is decoded as a little-endian u64. The producing
/// receiver writes native integers on little-endian hosts; the byte order is
/// pinned here and must never be changed without a matching producer change.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    // The delimiter is guaranteed present once a transmission exists, so
    // anything else here means framing is lost.
    if src[..DELIMITER_LEN] != config.delimiter {
        return Err(FrameError::DelimiterMismatch);
    }

    let length = u64::from_le_bytes(src[DELIMITER_LEN..HEADER_SIZE].try_into().unwrap());

    // checked_add keeps a corrupt length near u64::MAX from overflowing the
    // completeness check; such a frame can never complete, so we keep waiting.
    let frame_end = match length.checked_add(HEADER_SIZE as u64) {
        Some(end) => end,
        None => return Ok(None),
    };
    if (src.len() as u64) < frame_end {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(length as usize).freeze();

    Ok(Some(payload))
}
