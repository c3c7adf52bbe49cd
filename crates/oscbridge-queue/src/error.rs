use nix::errno::Errno;

/// Errors that can occur on message queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The queue name is not a valid POSIX mq name.
    #[error("invalid queue name {name:?}: must start with '/' and contain no further slashes")]
    InvalidName { name: String },

    /// Failed to open (or create) the named queue.
    #[error("failed to open message queue {name}: {source}")]
    Open { name: String, source: Errno },

    /// Failed to fetch queue attributes.
    #[error("failed to fetch attributes for message queue {name}: {source}")]
    Attributes { name: String, source: Errno },

    /// Failed to update queue attributes (blocking-mode toggle).
    #[error("failed to update attributes for message queue {name}: {source}")]
    SetAttributes { name: String, source: Errno },

    /// A receive failed.
    #[error("failed to receive from message queue {name}: {source}")]
    Receive { name: String, source: Errno },

    /// A send failed.
    #[error("failed to send to message queue {name}: {source}")]
    Send { name: String, source: Errno },

    /// Failed to unlink the named queue.
    #[error("failed to unlink message queue {name}: {source}")]
    Unlink { name: String, source: Errno },

    /// The queue handle has already been closed.
    #[error("message queue {name} is closed")]
    Closed { name: String },
}

pub type Result<T> = std::result::Result<T, QueueError>;
