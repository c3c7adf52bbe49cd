//! Terminator framing for the OSC TCP stream.
//!
//! Every forwarded unit on the wire is `<payload bytes><"[/TCP]">`: a
//! fixed 6-byte ASCII terminator with no length prefix. A stream-oriented
//! consumer scans for the terminator to split the byte stream back into
//! discrete OSC packets. Payloads are opaque; no other transformation
//! happens between the queue and the socket.

pub mod codec;
pub mod error;
pub mod writer;

pub use codec::{decode_frame, encode_frame, DEFAULT_MAX_FRAMED, TERMINATOR, TERMINATOR_LEN};
pub use error::{FrameError, Result};
pub use writer::FrameWriter;
