//! Outer frame reassembly for the broadcast API byte stream.
//!
//! The broadcast receiver process multiplexes independent transmissions onto
//! one continuous byte stream with no out-of-band signaling. Every
//! transmission is prefixed with a 40-byte header:
//! - A fixed 32-byte delimiter marking the start of the structure
//! - An 8-byte little-endian payload length
//!
//! The delimiter is written by the receiver itself, so it is never lost in
//! transit. If the expected position does not hold the delimiter, the stream
//! is desynchronized and the session cannot be recovered.

pub mod accumulator;
pub mod codec;
pub mod error;
pub mod reader;

pub use accumulator::FrameAccumulator;
pub use codec::{decode_frame, encode_frame, FrameConfig, DELIMITER, DELIMITER_LEN, HEADER_SIZE};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
