use std::fmt;
use std::io;

use skyfeed_frame::FrameError;
use skyfeed_pipe::PipeError;
use skyfeed_rx::RxError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn pipe_error(context: &str, err: PipeError) -> CliError {
    match err {
        PipeError::Create { source, .. }
        | PipeError::Open { source, .. }
        | PipeError::Io(source) => io_error(context, source),
        PipeError::NotAPipe { .. } => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::DelimiterMismatch => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        FrameError::SourceClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn rx_error(context: &str, err: RxError) -> CliError {
    match err {
        RxError::Frame(err) => frame_error(context, err),
        RxError::Source(source) => io_error(context, source),
        RxError::Decrypt(source) => match source.kind() {
            io::ErrorKind::NotFound => CliError::new(
                FAILURE,
                format!("{context}: gpg binary not found ({source})"),
            ),
            _ => io_error(context, source),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_mismatch_maps_to_data_invalid() {
        let err = rx_error("receive", RxError::Frame(FrameError::DelimiterMismatch));
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("desynchronized"));
    }

    #[test]
    fn permission_denied_maps_to_dedicated_code() {
        let err = io_error(
            "open",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }

    #[test]
    fn not_a_pipe_is_usage_error() {
        let err = pipe_error(
            "open pipe",
            PipeError::NotAPipe {
                path: "/tmp/file".into(),
            },
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn missing_gpg_is_reported_plainly() {
        let err = rx_error(
            "receive",
            RxError::Decrypt(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("gpg binary not found"));
    }
}
