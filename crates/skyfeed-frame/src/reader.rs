use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::accumulator::FrameAccumulator;
use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frame payloads from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete payloads.
/// Frames already buffered are drained before the stream is read again, so a
/// single read that carries several back-to-back frames loses nothing.
pub struct FrameReader<T> {
    inner: T,
    acc: FrameAccumulator,
}

impl<T: Read> FrameReader<T> {
    /// Create a frame reader with the default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            acc: FrameAccumulator::with_config(config),
        }
    }

    /// Read the next complete frame payload (blocking).
    ///
    /// Returns `Err(FrameError::SourceClosed)` at EOF, whether or not a
    /// partial frame was buffered — a torn frame at close is lost by design.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(payload) = self.acc.try_extract()? {
                return Ok(payload);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::SourceClosed);
            }

            self.acc.feed(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
