use std::thread;
use std::time::Duration;

use oscbridge_queue::OscQueue;
use tracing::{info, warn};

use crate::error::Result;
use crate::listener::RelayListener;
use crate::session::Session;

/// Delay before retrying a failed accept.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Relay behavior knobs.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Ceiling for a framed message (payload + terminator), in bytes. Must
    /// be at least the queue's max message size; checked at the start of
    /// every session.
    pub max_framed_size: usize,
    /// Delay before retrying a failed accept.
    pub accept_retry_delay: Duration,
    /// Stop after this many completed client sessions. `None` runs forever.
    pub max_sessions: Option<usize>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_framed_size: oscbridge_frame::DEFAULT_MAX_FRAMED,
            accept_retry_delay: ACCEPT_RETRY_DELAY,
            max_sessions: None,
        }
    }
}

/// Serial accept loop: one client at a time, each handed a fresh
/// [`Session`].
///
/// While a session streams, the loop is blocked inside it; a second client
/// waits in the OS listen backlog until the first disconnects.
pub struct Relay {
    listener: RelayListener,
    queue: OscQueue,
    config: RelayConfig,
}

impl Relay {
    pub fn new(listener: RelayListener, queue: OscQueue, config: RelayConfig) -> Self {
        Self {
            listener,
            queue,
            config,
        }
    }

    /// Run the relay until a fatal error (or `max_sessions` is reached).
    ///
    /// Accept failures are transient: logged, then retried after
    /// `accept_retry_delay`; an active connection is never affected since
    /// none exists while accept is failing. A returned error means the
    /// service cannot continue (queue failure or a framed-size mismatch).
    pub fn run(&self) -> Result<()> {
        let mut completed = 0usize;
        loop {
            if let Some(max) = self.config.max_sessions {
                if completed >= max {
                    return Ok(());
                }
            }

            let (stream, peer) = match self.listener.accept() {
                Ok(connection) => connection,
                Err(err) => {
                    warn!(%err, "accept failed, retrying");
                    thread::sleep(self.config.accept_retry_delay);
                    continue;
                }
            };

            info!(%peer, "OSC client connected");
            Session::new(&self.queue, stream, peer, self.config.max_framed_size).run()?;
            completed += 1;
        }
    }
}
