//! Named pipe (FIFO) input source.
//!
//! The broadcast receiver process writes reassembled API data into a local
//! named pipe. This crate owns the Unix specifics of that source: creating
//! the FIFO when it doesn't exist yet, refusing to read from a path that is
//! not a FIFO, and exposing a blocking [`Read`](std::io::Read) stream.
//!
//! The blocking read is the consumer's only suspension point and its natural
//! backpressure mechanism — the producer writes whole frames, the consumer
//! simply waits for bytes.

pub mod error;

#[cfg(unix)]
pub mod fifo;

pub use error::{PipeError, Result};

#[cfg(unix)]
pub use fifo::Pipe;
