use std::net::{SocketAddr, TcpStream};

use oscbridge_frame::{FrameError, FrameWriter};
use oscbridge_queue::OscQueue;
use tracing::{debug, info, warn};

use crate::error::{RelayError, Result};

/// Per-connection phases. Each accepted client starts in `Draining`; a
/// broken connection is abandoned, never resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Draining,
    Forwarding,
    Closed,
}

/// One client connection's lifetime.
///
/// Drains the stale queue backlog so the client only ever sees messages
/// produced after it connected, then forwards each queued message until a
/// write fails.
pub struct Session<'a> {
    queue: &'a OscQueue,
    writer: FrameWriter<TcpStream>,
    peer: SocketAddr,
    recv_buf: Vec<u8>,
    max_framed: usize,
}

impl<'a> Session<'a> {
    pub fn new(queue: &'a OscQueue, stream: TcpStream, peer: SocketAddr, max_framed: usize) -> Self {
        Self {
            queue,
            writer: FrameWriter::with_max_framed(stream, max_framed),
            peer,
            recv_buf: vec![0u8; max_framed],
            max_framed,
        }
    }

    /// Drive the session to completion.
    ///
    /// Returns `Ok(())` when the client disconnects; the socket is dropped
    /// and control returns to the accept loop. An error is fatal for the
    /// whole service: the framed-size ceiling no longer covers the queue's
    /// message size, or the queue itself failed.
    pub fn run(mut self) -> Result<()> {
        let mut state = SessionState::Draining;
        loop {
            state = match state {
                SessionState::Draining => self.drain()?,
                SessionState::Forwarding => self.forward()?,
                SessionState::Closed => {
                    info!(peer = %self.peer, "client disconnected, waiting for next connection");
                    return Ok(());
                }
            };
        }
    }

    /// Entry phase: verify the ceiling still covers the queue's message
    /// size, then discard backlog accumulated while no client was
    /// connected.
    fn drain(&mut self) -> Result<SessionState> {
        let attrs = self.queue.attributes()?;
        if self.max_framed < attrs.max_message_size {
            return Err(RelayError::MessageSizeMismatch {
                configured: self.max_framed,
                actual: attrs.max_message_size,
            });
        }

        let discarded = self.queue.drain(&mut self.recv_buf)?;
        if discarded > 0 {
            debug!(peer = %self.peer, discarded, "discarded stale messages for new client");
        }
        Ok(SessionState::Forwarding)
    }

    /// Forward one queued message to the client.
    fn forward(&mut self) -> Result<SessionState> {
        let len = self.queue.receive(&mut self.recv_buf)?;
        match self.writer.send(&self.recv_buf[..len]) {
            Ok(()) => Ok(SessionState::Forwarding),
            Err(FrameError::PayloadTooLarge { size, max }) => {
                // The message is dropped, never truncated or written past
                // the ceiling; the connection stays up.
                warn!(peer = %self.peer, size, max, "dropping oversized message");
                Ok(SessionState::Forwarding)
            }
            Err(err) => {
                debug!(peer = %self.peer, %err, "write failed, closing connection");
                Ok(SessionState::Closed)
            }
        }
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.peer)
            .field("queue", &self.queue.name())
            .finish()
    }
}
