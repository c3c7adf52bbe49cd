/// Errors that can occur in the relay loop.
///
/// Everything here is fatal for the service except `Accept`, which the
/// loop absorbs with a backoff retry. Per-connection write failures never
/// surface as errors at all; they end the session and the loop continues.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Failed to bind the listening socket on any wildcard address.
    #[error("failed to bind TCP listener on port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// The configured framed-size ceiling is below the queue's actual max
    /// message size, so a queued message could not be framed safely.
    #[error("framed-size ceiling {configured} is below queue max message size {actual}")]
    MessageSizeMismatch { configured: usize, actual: usize },

    /// The message queue failed.
    #[error(transparent)]
    Queue(#[from] oscbridge_queue::QueueError),
}

pub type Result<T> = std::result::Result<T, RelayError>;
