use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::{decode_frame, FrameConfig};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Accumulates stream bytes and extracts complete outer frames.
///
/// The accumulator owns the unconsumed portion of the stream. Bytes are
/// appended with [`feed`](Self::feed) in whatever chunk sizes the source
/// produces; [`try_extract`](Self::try_extract) returns a payload only once
/// header and payload are fully buffered, consuming them from the front and
/// leaving any following bytes intact for the next frame.
///
/// No upper bound is enforced on the buffer. Backpressure is the caller's
/// responsibility via a bounded read chunk size.
pub struct FrameAccumulator {
    buf: BytesMut,
    config: FrameConfig,
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAccumulator {
    /// Create an accumulator with the default frame configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create an accumulator with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Append bytes read from the source.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Try to extract the next complete frame payload.
    ///
    /// Returns `Ok(None)` while more input is needed. Repeated calls without
    /// an intervening [`feed`](Self::feed) yield the same result until new
    /// bytes arrive; after a successful extraction the next call starts on
    /// the following frame, which may already be fully buffered. Callers
    /// should therefore drain in a loop before reading more.
    pub fn try_extract(&mut self) -> Result<Option<Bytes>> {
        match decode_frame(&mut self.buf, &self.config)? {
            Some(payload) => {
                debug!(
                    bytes = payload.len(),
                    remaining = self.buf.len(),
                    "frame extracted"
                );
                Ok(Some(payload))
            }
            None => {
                trace!(buffered = self.buf.len(), "incomplete frame, need more data");
                Ok(None)
            }
        }
    }

    /// Number of buffered, not-yet-consumed bytes.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// True if no unconsumed bytes remain.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The frame configuration in force.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
