use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Terminator appended to every forwarded message.
pub const TERMINATOR: &[u8; 6] = b"[/TCP]";

/// Length of [`TERMINATOR`] in bytes.
pub const TERMINATOR_LEN: usize = 6;

/// Default ceiling for a framed message (payload + terminator), in bytes.
///
/// Must be at least the queue's configured max message size, so a message
/// read from the queue always fits in the frame buffer with its terminator.
pub const DEFAULT_MAX_FRAMED: usize = 2048;

/// Encode one payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────────────────┬──────────────┐
/// │ Payload (n bytes)   │ "[/TCP]" (6) │
/// └─────────────────────┴──────────────┘
/// ```
///
/// Rejects payloads whose framed length would exceed `max_framed`; the
/// payload is never truncated and the buffer is never overrun.
pub fn encode_frame(payload: &[u8], max_framed: usize, dst: &mut BytesMut) -> Result<()> {
    if payload.len() + TERMINATOR_LEN > max_framed {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: max_framed.saturating_sub(TERMINATOR_LEN),
        });
    }
    dst.reserve(payload.len() + TERMINATOR_LEN);
    dst.put_slice(payload);
    dst.put_slice(TERMINATOR);
    Ok(())
}

/// Split one payload off the front of a terminator-delimited stream buffer.
///
/// Returns `None` if the buffer does not yet hold a complete frame. On
/// success, consumes the payload and its terminator from the buffer. This
/// is the consumer side of the wire format, used by clients and tests.
pub fn decode_frame(src: &mut BytesMut) -> Option<Bytes> {
    let pos = find_terminator(src)?;
    let payload = src.split_to(pos).freeze();
    src.advance(TERMINATOR_LEN);
    Some(payload)
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(TERMINATOR_LEN).position(|window| window == TERMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_exactly_the_terminator() {
        let mut buf = BytesMut::new();
        encode_frame(b"/bar,i,42", DEFAULT_MAX_FRAMED, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"/bar,i,42[/TCP]");
        assert_eq!(buf.len(), 15);
    }

    #[test]
    fn encode_empty_payload_is_just_the_terminator() {
        let mut buf = BytesMut::new();
        encode_frame(b"", DEFAULT_MAX_FRAMED, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), TERMINATOR);
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = vec![0u8; DEFAULT_MAX_FRAMED - TERMINATOR_LEN + 1];
        let mut buf = BytesMut::new();
        let err = encode_frame(&payload, DEFAULT_MAX_FRAMED, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge {
                size: 2043,
                max: 2042
            }
        ));
        assert!(buf.is_empty(), "rejected payload must not be written");
    }

    #[test]
    fn encode_accepts_payload_at_the_ceiling() {
        let payload = vec![0u8; DEFAULT_MAX_FRAMED - TERMINATOR_LEN];
        let mut buf = BytesMut::new();
        encode_frame(&payload, DEFAULT_MAX_FRAMED, &mut buf).unwrap();
        assert_eq!(buf.len(), DEFAULT_MAX_FRAMED);
    }

    #[test]
    fn decode_roundtrip() {
        let mut buf = BytesMut::new();
        encode_frame(b"/foo,f,1.0", DEFAULT_MAX_FRAMED, &mut buf).unwrap();

        let payload = decode_frame(&mut buf).unwrap();
        assert_eq!(payload.as_ref(), b"/foo,f,1.0");
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_incomplete_frame_is_none() {
        let mut buf = BytesMut::from(&b"/foo,f,1.0[/TC"[..]);
        assert!(decode_frame(&mut buf).is_none());
        assert_eq!(buf.len(), 14, "incomplete frame must not be consumed");
    }

    #[test]
    fn decode_multiple_frames_in_order() {
        let mut buf = BytesMut::new();
        encode_frame(b"first", DEFAULT_MAX_FRAMED, &mut buf).unwrap();
        encode_frame(b"second", DEFAULT_MAX_FRAMED, &mut buf).unwrap();

        assert_eq!(decode_frame(&mut buf).unwrap().as_ref(), b"first");
        assert_eq!(decode_frame(&mut buf).unwrap().as_ref(), b"second");
        assert!(decode_frame(&mut buf).is_none());
    }

    #[test]
    fn decode_terminator_split_across_reads() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"/bar,i,42[/");
        assert!(decode_frame(&mut buf).is_none());

        buf.extend_from_slice(b"TCP]");
        let payload = decode_frame(&mut buf).unwrap();
        assert_eq!(payload.as_ref(), b"/bar,i,42");
    }

    #[test]
    fn decode_payload_with_partial_terminator_bytes() {
        let mut buf = BytesMut::new();
        encode_frame(b"addr[/TC-not-it", DEFAULT_MAX_FRAMED, &mut buf).unwrap();

        let payload = decode_frame(&mut buf).unwrap();
        assert_eq!(payload.as_ref(), b"addr[/TC-not-it");
    }

    #[test]
    fn decode_empty_payload_frame() {
        let mut buf = BytesMut::from(&TERMINATOR[..]);
        let payload = decode_frame(&mut buf).unwrap();
        assert!(payload.is_empty());
        assert!(buf.is_empty());
    }
}
