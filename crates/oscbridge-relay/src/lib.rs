//! Serial TCP relay loop for the OSC bridge.
//!
//! One listening socket, one queue handle, one client at a time. Each
//! accepted connection runs a [`Session`]: discard the queue backlog
//! accumulated while no client was connected, then forward every queued
//! message to the socket with terminator framing until the client goes
//! away. The [`Relay`] accept loop then waits for the next client.
//!
//! There is no internal parallelism: while a session streams, a second
//! client waits in the OS listen backlog.

pub mod error;
pub mod listener;
pub mod relay;
pub mod session;

pub use error::{RelayError, Result};
pub use listener::{RelayListener, DEFAULT_PORT};
pub use relay::{Relay, RelayConfig, ACCEPT_RETRY_DELAY};
pub use session::Session;
