use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{MessageError, Result};

/// Capacity of the null-padded name field.
pub const NAME_FIELD_LEN: usize = 255;

/// Message header: name (255) + reserved pad (1) + checksum (4) = 260 bytes.
pub const HEADER_LEN: usize = NAME_FIELD_LEN + 1 + 4;

const CHECKSUM_OFFSET: usize = NAME_FIELD_LEN + 1;

/// A decoded inner message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Logical name recovered from the header, trailing NULs trimmed.
    pub name: String,
    /// Application content following the header.
    pub payload: Bytes,
}

/// Decode and integrity-check an inner message.
///
/// The checksum is a CRC32 over the payload; a mismatch means the message
/// was corrupted or tampered with and must be discarded. Both failure modes
/// are recoverable at the session level.
pub fn decode_message(data: &[u8]) -> Result<Message> {
    if data.len() < HEADER_LEN {
        return Err(MessageError::Truncated { len: data.len() });
    }

    let name_field = &data[..NAME_FIELD_LEN];
    let name_len = name_field
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |i| i + 1);
    let name = String::from_utf8_lossy(&name_field[..name_len]).into_owned();

    let expected = u32::from_le_bytes(data[CHECKSUM_OFFSET..HEADER_LEN].try_into().unwrap());

    let payload = &data[HEADER_LEN..];
    let actual = crc32fast::hash(payload);
    if actual != expected {
        return Err(MessageError::ChecksumMismatch {
            expected,
            actual,
            size: payload.len(),
        });
    }

    Ok(Message {
        name,
        payload: Bytes::copy_from_slice(payload),
    })
}

/// Encode an inner message: null-padded name, reserved byte, CRC32, payload.
pub fn encode_message(name: &str, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let name_bytes = name.as_bytes();
    if name_bytes.len() > NAME_FIELD_LEN {
        return Err(MessageError::NameTooLong {
            len: name_bytes.len(),
        });
    }

    dst.reserve(HEADER_LEN + payload.len());
    dst.put_slice(name_bytes);
    dst.put_bytes(0, NAME_FIELD_LEN - name_bytes.len());
    dst.put_u8(0); // reserved
    dst.put_u32_le(crc32fast::hash(payload));
    dst.put_slice(payload);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(name: &str, payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_message(name, payload, &mut buf).unwrap();
        buf
    }

    #[test]
    fn checksum_round_trip() {
        let buf = encoded("report.pdf", b"important content");

        let msg = decode_message(&buf).unwrap();
        assert_eq!(msg.name, "report.pdf");
        assert_eq!(msg.payload.as_ref(), b"important content");
    }

    #[test]
    fn name_trimming_recovers_original() {
        let buf = encoded("short", b"x");
        // The name field is padded with NULs up to its full capacity.
        assert_eq!(&buf[..5], b"short");
        assert!(buf[5..NAME_FIELD_LEN].iter().all(|&b| b == 0));

        let msg = decode_message(&buf).unwrap();
        assert_eq!(msg.name, "short");
    }

    #[test]
    fn name_at_field_capacity() {
        let name = "n".repeat(NAME_FIELD_LEN);
        let buf = encoded(&name, b"payload");

        let msg = decode_message(&buf).unwrap();
        assert_eq!(msg.name, name);
    }

    #[test]
    fn name_too_long_rejected() {
        let name = "n".repeat(NAME_FIELD_LEN + 1);
        let mut buf = BytesMut::new();
        let err = encode_message(&name, b"", &mut buf).unwrap_err();
        assert!(matches!(err, MessageError::NameTooLong { len } if len == NAME_FIELD_LEN + 1));
    }

    #[test]
    fn single_bit_flip_in_payload_detected() {
        let payload = b"sensitive bytes";
        for bit in 0..payload.len() * 8 {
            let mut buf = encoded("f", payload).to_vec();
            buf[HEADER_LEN + bit / 8] ^= 1 << (bit % 8);

            let err = decode_message(&buf).unwrap_err();
            assert!(
                matches!(err, MessageError::ChecksumMismatch { .. }),
                "bit flip {bit} went undetected"
            );
        }
    }

    #[test]
    fn checksum_mismatch_reports_both_values() {
        let mut buf = encoded("f", b"data").to_vec();
        buf[HEADER_LEN] ^= 0xFF;

        match decode_message(&buf).unwrap_err() {
            MessageError::ChecksumMismatch {
                expected,
                actual,
                size,
            } => {
                assert_eq!(expected, crc32fast::hash(b"data"));
                assert_ne!(actual, expected);
                assert_eq!(size, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncated_input_rejected() {
        let err = decode_message(&[0u8; HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, MessageError::Truncated { len } if len == HEADER_LEN - 1));

        let err = decode_message(b"").unwrap_err();
        assert!(matches!(err, MessageError::Truncated { len: 0 }));
    }

    #[test]
    fn empty_payload_is_valid() {
        let buf = encoded("empty", b"");
        let msg = decode_message(&buf).unwrap();
        assert_eq!(msg.name, "empty");
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn crc_matches_zlib_reference() {
        // zlib.crc32(b"hello world!!") == 0xAD6B56F4 — the producer computes
        // its checksum with zlib, so ours must agree byte for byte.
        assert_eq!(crc32fast::hash(b"hello world!!"), 0xAD6B_56F4);
    }

    #[test]
    fn interior_nuls_in_name_preserved() {
        let mut raw = BytesMut::new();
        raw.put_slice(b"a\0b");
        raw.put_bytes(0, NAME_FIELD_LEN - 3);
        raw.put_u8(0);
        raw.put_u32_le(crc32fast::hash(b"p"));
        raw.put_slice(b"p");

        let msg = decode_message(&raw).unwrap();
        assert_eq!(msg.name, "a\0b");
    }
}
