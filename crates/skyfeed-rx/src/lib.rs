//! Receive pipeline for broadcast API messages.
//!
//! Drives the full path from raw stream bytes to files on disk:
//! read → accumulate → extract frame → decrypt → parse → save.
//!
//! Only framing loss and source failure abort the loop. Everything
//! downstream of an extracted frame — a message not addressed to this
//! identity, a corrupted checksum, a malformed header — is isolated to that
//! single message, keeping the session available for later transmissions.

pub mod decrypt;
pub mod error;
pub mod receiver;
pub mod sink;

pub use decrypt::{Decryption, Decryptor, GpgDecryptor, PassthroughDecryptor};
pub use error::{Result, RxError};
pub use receiver::{ProcessingMode, Receiver, RxStats, READ_CHUNK_SIZE};
pub use sink::{DownloadSink, SinkError};
