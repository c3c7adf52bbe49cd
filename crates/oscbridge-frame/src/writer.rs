use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, DEFAULT_MAX_FRAMED};
use crate::error::{FrameError, Result};

/// Writes terminator-framed messages to any `Write` stream.
///
/// Owns a reusable encode buffer sized to the framed-message ceiling; the
/// buffer is cleared per message and appends are bounds-checked by
/// [`encode_frame`].
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    max_framed: usize,
}

impl<T: Write> FrameWriter<T> {
    /// Create a frame writer with the default framed-size ceiling.
    pub fn new(inner: T) -> Self {
        Self::with_max_framed(inner, DEFAULT_MAX_FRAMED)
    }

    /// Create a frame writer with an explicit framed-size ceiling.
    pub fn with_max_framed(inner: T, max_framed: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(max_framed),
            max_framed,
        }
    }

    /// Frame and write one payload (blocking).
    ///
    /// The full framed message is written or an error is returned: a write
    /// of zero bytes is `ConnectionClosed`, `Interrupted` is retried, and
    /// any other write error propagates as I/O failure. Callers treat every
    /// error as a client disconnect.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(payload, self.max_framed, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// The framed-size ceiling this writer enforces.
    pub fn max_framed(&self) -> usize {
        self.max_framed
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::{decode_frame, TERMINATOR_LEN};

    #[test]
    fn writes_payload_followed_by_terminator() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(b"/bar,i,42").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire.as_slice(), b"/bar,i,42[/TCP]");
    }

    #[test]
    fn consecutive_sends_do_not_interleave() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(b"one").unwrap();
        writer.send(b"two").unwrap();

        let mut wire = BytesMut::from(writer.into_inner().into_inner().as_slice());
        assert_eq!(decode_frame(&mut wire).unwrap().as_ref(), b"one");
        assert_eq!(decode_frame(&mut wire).unwrap().as_ref(), b"two");
        assert!(wire.is_empty());
    }

    #[test]
    fn oversized_payload_rejected_before_any_write() {
        let mut writer = FrameWriter::with_max_framed(Cursor::new(Vec::<u8>::new()), 16);
        let err = writer.send(&[0u8; 11]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 11, max: 10 }));
        assert!(writer.into_inner().into_inner().is_empty());
    }

    #[test]
    fn payload_at_ceiling_accepted() {
        let mut writer = FrameWriter::with_max_framed(Cursor::new(Vec::<u8>::new()), 16);
        writer.send(&[7u8; 16 - TERMINATOR_LEN]).unwrap();
        assert_eq!(writer.into_inner().into_inner().len(), 16);
    }

    #[test]
    fn zero_write_is_connection_closed() {
        struct ZeroWriter;

        impl Write for ZeroWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn interrupted_write_is_retried() {
        struct InterruptedOnce {
            interrupted: bool,
            data: Vec<u8>,
        }

        impl Write for InterruptedOnce {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(InterruptedOnce {
            interrupted: false,
            data: Vec::new(),
        });
        writer.send(b"retry").unwrap();
        assert_eq!(writer.into_inner().data.as_slice(), b"retry[/TCP]");
    }

    #[test]
    fn short_writes_are_completed() {
        struct OneBytePerCall {
            data: Vec<u8>,
        }

        impl Write for OneBytePerCall {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.data.push(buf[0]);
                Ok(1)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(OneBytePerCall { data: Vec::new() });
        writer.send(b"ab").unwrap();
        assert_eq!(writer.into_inner().data.as_slice(), b"ab[/TCP]");
    }

    #[test]
    fn write_error_propagates_as_io() {
        struct BrokenPipe;

        impl Write for BrokenPipe {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::BrokenPipe))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(BrokenPipe);
        let err = writer.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::Io(_)));
    }
}
