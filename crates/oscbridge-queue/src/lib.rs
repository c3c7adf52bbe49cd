//! POSIX message queue access for the OSC bridge.
//!
//! An external producer writes OSC payloads into a named, bounded message
//! queue; the bridge opens the same queue for read and forwards every
//! message to the connected TCP client. This crate wraps the queue handle:
//! blocking receive, non-blocking drain, attribute introspection, and the
//! write side used by the `send` tool and tests.
//!
//! This is the lowest layer of oscbridge. Unix only; POSIX message queues
//! do not exist elsewhere.

pub mod error;
pub mod mqueue;

pub use error::{QueueError, Result};
pub use mqueue::{OscQueue, QueueAttributes, DEFAULT_CAPACITY, DEFAULT_QUEUE_NAME};
