use std::fmt;
use std::io;

use nix::errno::Errno;
use oscbridge_frame::FrameError;
use oscbridge_queue::QueueError;
use oscbridge_relay::RelayError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const QUEUE_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
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
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::AddrInUse | io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn queue_error(context: &str, err: QueueError) -> CliError {
    let code = match &err {
        QueueError::InvalidName { .. } => USAGE,
        QueueError::Closed { .. } => INTERNAL,
        QueueError::Open { source, .. }
        | QueueError::Attributes { source, .. }
        | QueueError::SetAttributes { source, .. }
        | QueueError::Receive { source, .. }
        | QueueError::Send { source, .. }
        | QueueError::Unlink { source, .. } => errno_code(*source),
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn relay_error(context: &str, err: RelayError) -> CliError {
    match err {
        RelayError::Bind { source, .. } | RelayError::Accept(source) => io_error(context, source),
        RelayError::Queue(err) => queue_error(context, err),
        RelayError::MessageSizeMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

fn errno_code(errno: Errno) -> i32 {
    match errno {
        Errno::EACCES | Errno::EPERM => PERMISSION_DENIED,
        Errno::EMSGSIZE => DATA_INVALID,
        Errno::ETIMEDOUT => TIMEOUT,
        _ => QUEUE_ERROR,
    }
}
