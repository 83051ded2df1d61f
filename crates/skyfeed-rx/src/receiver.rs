use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};

use skyfeed_frame::FrameAccumulator;
use skyfeed_message::{decode_message, MessageError};
use tracing::{debug, error, info, trace, warn};

use crate::decrypt::{Decryption, Decryptor};
use crate::error::{Result, RxError};
use crate::sink::DownloadSink;

/// Bounded read chunk size. The accumulator itself is unbounded; this is the
/// backpressure knob.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// How an extracted frame payload is turned into a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Decrypt, parse the inner message header, save under its name.
    Standard,
    /// Decrypt, skip the inner header, save under a generated name.
    RawSave,
    /// All transmissions on this pipe are plaintext; save frames directly
    /// under generated names.
    Plaintext,
}

/// Counters accumulated over one receive session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RxStats {
    /// Complete outer frames extracted from the stream.
    pub frames: u64,
    /// Messages written to the download directory.
    pub saved: u64,
    /// Frames not addressed to the local identity.
    pub misses: u64,
    /// Inner messages discarded for checksum mismatch.
    pub integrity_failures: u64,
    /// Inner messages discarded as malformed (short header, unsafe name).
    pub malformed: u64,
    /// Messages lost to a per-file write failure.
    pub save_failures: u64,
}

/// The receive loop: reads the source, reassembles frames, and hands each
/// one through decryption, parsing, and persistence.
///
/// The loop has one suspension point — the blocking read — and drains every
/// fully-buffered frame before suspending again, so a single read carrying
/// several back-to-back frames loses nothing. The shutdown flag is honored
/// between processing steps, never mid-extraction.
pub struct Receiver {
    acc: FrameAccumulator,
    decryptor: Box<dyn Decryptor>,
    sink: DownloadSink,
    mode: ProcessingMode,
    limit: Option<u64>,
    stats: RxStats,
}

impl Receiver {
    /// Create a receiver with the default frame configuration.
    pub fn new(decryptor: Box<dyn Decryptor>, sink: DownloadSink, mode: ProcessingMode) -> Self {
        Self {
            acc: FrameAccumulator::new(),
            decryptor,
            sink,
            mode,
            limit: None,
            stats: RxStats::default(),
        }
    }

    /// Stop after `limit` messages have been saved.
    pub fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    /// Run the loop until the source closes, the limit is reached, the
    /// shutdown flag is set, or a fatal error occurs.
    ///
    /// On a graceful stop the session counters are returned.
    pub fn run(&mut self, mut source: impl Read, shutdown: &AtomicBool) -> Result<RxStats> {
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        info!(mode = ?self.mode, "waiting for data");

        while !shutdown.load(Ordering::SeqCst) {
            // Drain every complete frame before reading again.
            while let Some(payload) = self.acc.try_extract()? {
                self.process_frame(payload.as_ref())?;
                if self.limit_reached() {
                    info!(saved = self.stats.saved, "message limit reached");
                    return Ok(self.stats.clone());
                }
                if shutdown.load(Ordering::SeqCst) {
                    return Ok(self.stats.clone());
                }
            }

            let read = match source.read(&mut chunk) {
                Ok(0) => {
                    info!("source closed");
                    break;
                }
                Ok(n) => n,
                // Re-check the shutdown flag; a signal landed mid-read.
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RxError::Source(err)),
            };

            self.acc.feed(&chunk[..read]);
            trace!(
                bytes = read,
                buffered = self.acc.buffered(),
                "read chunk from source"
            );
        }

        if !self.acc.is_empty() {
            // A torn frame at shutdown is lost by design; the producer has
            // no resend semantics.
            debug!(buffered = self.acc.buffered(), "dropping partial frame");
        }

        Ok(self.stats.clone())
    }

    /// Session counters so far.
    pub fn stats(&self) -> &RxStats {
        &self.stats
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.stats.saved >= limit)
    }

    fn process_frame(&mut self, ciphertext: &[u8]) -> Result<()> {
        self.stats.frames += 1;

        let plaintext = match self.decryptor.decrypt(ciphertext)? {
            Decryption::Plaintext(data) => data,
            Decryption::NotForUs => {
                debug!(
                    bytes = ciphertext.len(),
                    "message not addressed to this identity"
                );
                self.stats.misses += 1;
                return Ok(());
            }
        };

        match self.mode {
            ProcessingMode::Standard => match decode_message(&plaintext) {
                Ok(msg) => {
                    debug!(name = %msg.name, bytes = msg.payload.len(), "message verified");
                    self.save(&msg.payload, Some(&msg.name));
                }
                Err(err @ MessageError::ChecksumMismatch { .. }) => {
                    warn!(%err, "discarding corrupted message");
                    self.stats.integrity_failures += 1;
                }
                Err(err) => {
                    warn!(%err, bytes = plaintext.len(), "discarding malformed message");
                    self.stats.malformed += 1;
                }
            },
            ProcessingMode::RawSave | ProcessingMode::Plaintext => {
                self.save(&plaintext, None);
            }
        }

        Ok(())
    }

    fn save(&mut self, data: &[u8], name: Option<&str>) {
        match self.sink.save(data, name) {
            Ok(path) => {
                info!(path = %path.display(), bytes = data.len(), "saved message");
                self.stats.saved += 1;
            }
            Err(err @ crate::sink::SinkError::UnsafeName { .. }) => {
                warn!(%err, "discarding message");
                self.stats.malformed += 1;
            }
            Err(err) => {
                error!(%err, "failed to save message");
                self.stats.save_failures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;
    use skyfeed_frame::{encode_frame, FrameConfig};

    use super::*;
    use crate::decrypt::PassthroughDecryptor;

    fn framed(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for payload in payloads {
            encode_frame(payload, &mut buf, &FrameConfig::default());
        }
        buf.to_vec()
    }

    fn plaintext_receiver(dir: &std::path::Path) -> Receiver {
        Receiver::new(
            Box::new(PassthroughDecryptor),
            DownloadSink::new(dir),
            ProcessingMode::Plaintext,
        )
    }

    #[test]
    fn preset_shutdown_flag_stops_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut receiver = plaintext_receiver(dir.path());

        let shutdown = AtomicBool::new(true);
        let stats = receiver
            .run(Cursor::new(framed(&[b"never read"])), &shutdown)
            .unwrap();
        assert_eq!(stats.frames, 0);
    }

    #[test]
    fn limit_stops_after_n_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut receiver = plaintext_receiver(dir.path());
        receiver.set_limit(2);

        let stream = framed(&[b"one", b"two", b"three"]);
        let stats = receiver
            .run(Cursor::new(stream), &AtomicBool::new(false))
            .unwrap();

        assert_eq!(stats.saved, 2);
        assert_eq!(stats.frames, 2);
    }

    #[test]
    fn desynchronized_stream_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut receiver = plaintext_receiver(dir.path());

        let mut stream = framed(&[b"good"]);
        stream[0] ^= 0x01;

        let err = receiver
            .run(Cursor::new(stream), &AtomicBool::new(false))
            .unwrap_err();
        assert!(matches!(
            err,
            RxError::Frame(skyfeed_frame::FrameError::DelimiterMismatch)
        ));
    }

    #[test]
    fn eof_with_partial_frame_is_graceful() {
        let dir = tempfile::tempdir().unwrap();
        let mut receiver = plaintext_receiver(dir.path());

        let mut stream = framed(&[b"complete"]);
        let torn = framed(&[b"torn"]);
        stream.extend_from_slice(&torn[..torn.len() - 2]);

        let stats = receiver
            .run(Cursor::new(stream), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.saved, 1);
    }
}
