use nix::errno::Errno;
use nix::mqueue::{
    mq_attr_member_t, mq_close, mq_getattr, mq_open, mq_receive, mq_remove_nonblock, mq_send,
    mq_set_nonblock, mq_unlink, MQ_OFlag, MqAttr, MqdT,
};
use nix::sys::stat::Mode;
use tracing::{debug, warn};

use crate::error::{QueueError, Result};

/// Default queue name shared with the OSC producer.
pub const DEFAULT_QUEUE_NAME: &str = "/osc";

/// Default queue capacity, in messages.
pub const DEFAULT_CAPACITY: i64 = 10;

/// Maximum length of a queue name, including the leading slash.
const MAX_NAME_LEN: usize = 255;

/// Snapshot of a queue's current attributes.
#[derive(Debug, Clone, Copy)]
pub struct QueueAttributes {
    /// Maximum number of messages the queue can hold.
    pub max_messages: i64,
    /// Maximum size of a single message, in bytes.
    pub max_message_size: usize,
    /// Number of messages currently queued.
    pub current_messages: i64,
    /// Whether the descriptor is in non-blocking mode.
    pub non_blocking: bool,
}

/// A named POSIX message queue, opened for one direction.
///
/// The queue is created on open if it does not exist yet, so whichever side
/// gets there first (producer or bridge) establishes it with the agreed
/// capacity and message-size ceiling. The handle is closed on drop; the
/// queue name is never unlinked here, since the producer may outlive the
/// bridge.
pub struct OscQueue {
    mqd: Option<MqdT>,
    name: String,
}

impl OscQueue {
    /// Open the named queue for reading, creating it if absent.
    pub fn open_read(name: &str, capacity: i64, max_message_size: usize) -> Result<Self> {
        Self::open(name, MQ_OFlag::O_RDONLY, capacity, max_message_size)
    }

    /// Open the named queue for writing, creating it if absent.
    ///
    /// This is the producer side, used by the `send` tool and tests.
    pub fn open_write(name: &str, capacity: i64, max_message_size: usize) -> Result<Self> {
        Self::open(name, MQ_OFlag::O_WRONLY, capacity, max_message_size)
    }

    fn open(name: &str, oflag: MQ_OFlag, capacity: i64, max_message_size: usize) -> Result<Self> {
        validate_name(name)?;
        let attr = MqAttr::new(
            0,
            capacity as mq_attr_member_t,
            max_message_size as mq_attr_member_t,
            0,
        );
        let mqd = mq_open(
            name,
            oflag | MQ_OFlag::O_CREAT,
            Mode::S_IRUSR | Mode::S_IWUSR,
            Some(&attr),
        )
        .map_err(|source| QueueError::Open {
            name: name.to_string(),
            source,
        })?;
        debug!(queue = %name, "opened message queue");
        Ok(Self {
            mqd: Some(mqd),
            name: name.to_string(),
        })
    }

    /// Current queue attributes.
    pub fn attributes(&self) -> Result<QueueAttributes> {
        let attr = mq_getattr(self.handle()?).map_err(|source| QueueError::Attributes {
            name: self.name.clone(),
            source,
        })?;
        Ok(QueueAttributes {
            max_messages: attr.maxmsg() as i64,
            max_message_size: attr.msgsize() as usize,
            current_messages: attr.curmsgs() as i64,
            non_blocking: (attr.flags() as i64) & (MQ_OFlag::O_NONBLOCK.bits() as i64) != 0,
        })
    }

    /// Toggle non-blocking mode on the descriptor.
    ///
    /// This mutates shared queue state; safe here because the bridge is the
    /// queue's only reader and toggles only during the drain phase.
    pub fn set_nonblocking(&self, enabled: bool) -> Result<()> {
        let result = if enabled {
            mq_set_nonblock(self.handle()?)
        } else {
            mq_remove_nonblock(self.handle()?)
        };
        result.map(|_| ()).map_err(|source| QueueError::SetAttributes {
            name: self.name.clone(),
            source,
        })
    }

    /// Receive one message (blocking), writing its bytes into `buf`.
    ///
    /// `buf` must be at least `attributes().max_message_size` bytes or the
    /// receive fails with `EMSGSIZE`. Returns the message length; priority
    /// is discarded.
    pub fn receive(&self, buf: &mut [u8]) -> Result<usize> {
        let mut priority = 0u32;
        mq_receive(self.handle()?, buf, &mut priority).map_err(|source| QueueError::Receive {
            name: self.name.clone(),
            source,
        })
    }

    /// Receive one message without blocking.
    ///
    /// Returns `Ok(None)` when the queue is empty (the `EAGAIN` condition
    /// is the expected way to learn the queue is dry, not an error). The
    /// descriptor must already be in non-blocking mode.
    pub fn try_receive(&self, buf: &mut [u8]) -> Result<Option<usize>> {
        let mut priority = 0u32;
        match mq_receive(self.handle()?, buf, &mut priority) {
            Ok(len) => Ok(Some(len)),
            Err(Errno::EAGAIN) => Ok(None),
            Err(source) => Err(QueueError::Receive {
                name: self.name.clone(),
                source,
            }),
        }
    }

    /// Discard every message currently queued and return how many there were.
    ///
    /// Switches the descriptor to non-blocking, sweeps until the queue
    /// reports empty, then restores blocking mode for the forwarding loop.
    pub fn drain(&self, buf: &mut [u8]) -> Result<usize> {
        self.set_nonblocking(true)?;
        let mut discarded = 0usize;
        let swept = loop {
            match self.try_receive(buf) {
                Ok(Some(_)) => discarded += 1,
                Ok(None) => break Ok(discarded),
                Err(err) => break Err(err),
            }
        };
        self.set_nonblocking(false)?;
        swept
    }

    /// Send one message (blocking when the queue is full).
    pub fn send(&self, payload: &[u8], priority: u32) -> Result<()> {
        mq_send(self.handle()?, payload, priority).map_err(|source| QueueError::Send {
            name: self.name.clone(),
            source,
        })
    }

    /// The queue name this handle was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remove a named queue from the system.
    ///
    /// The bridge never unlinks its queue; this exists for tooling and
    /// test cleanup.
    pub fn unlink(name: &str) -> Result<()> {
        mq_unlink(name).map_err(|source| QueueError::Unlink {
            name: name.to_string(),
            source,
        })
    }

    fn handle(&self) -> Result<&MqdT> {
        self.mqd.as_ref().ok_or_else(|| QueueError::Closed {
            name: self.name.clone(),
        })
    }
}

impl Drop for OscQueue {
    fn drop(&mut self) {
        if let Some(mqd) = self.mqd.take() {
            if let Err(err) = mq_close(mqd) {
                warn!(queue = %self.name, %err, "failed to close message queue");
            }
        }
    }
}

impl std::fmt::Debug for OscQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscQueue")
            .field("name", &self.name)
            .field("open", &self.mqd.is_some())
            .finish()
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = name.len() > 1
        && name.len() <= MAX_NAME_LEN
        && name.starts_with('/')
        && !name[1..].contains('/');
    if valid {
        Ok(())
    } else {
        Err(QueueError::InvalidName {
            name: name.to_string(),
        })
    }
}
