use std::fs;

use oscbridge_frame::{FrameError, DEFAULT_MAX_FRAMED, TERMINATOR_LEN};
use oscbridge_queue::{OscQueue, DEFAULT_CAPACITY};

use crate::cmd::SendArgs;
use crate::exit::{frame_error, io_error, queue_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;

    let queue = OscQueue::open_write(&args.queue, DEFAULT_CAPACITY, DEFAULT_MAX_FRAMED)
        .map_err(|err| queue_error("queue open failed", err))?;

    let attrs = queue
        .attributes()
        .map_err(|err| queue_error("attribute fetch failed", err))?;
    let max_payload = attrs.max_message_size.saturating_sub(TERMINATOR_LEN);
    if payload.len() > max_payload {
        // The bridge would drop this message rather than frame it; refuse
        // it at the producer side with the same size contract.
        return Err(frame_error(
            "payload rejected",
            FrameError::PayloadTooLarge {
                size: payload.len(),
                max: max_payload,
            },
        ));
    }

    queue
        .send(&payload, args.priority)
        .map_err(|err| queue_error("send failed", err))?;

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_payload_resolves_to_bytes() {
        let args = SendArgs {
            queue: "/osc".to_string(),
            data: Some("/foo,f,1.0".to_string()),
            file: None,
            priority: 0,
        };
        assert_eq!(resolve_payload(&args).unwrap(), b"/foo,f,1.0");
    }

    #[test]
    fn missing_payload_defaults_to_empty() {
        let args = SendArgs {
            queue: "/osc".to_string(),
            data: None,
            file: None,
            priority: 0,
        };
        assert!(resolve_payload(&args).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let args = SendArgs {
            queue: "/osc".to_string(),
            data: None,
            file: Some(std::path::PathBuf::from("/nonexistent/payload.bin")),
            priority: 0,
        };
        assert!(resolve_payload(&args).is_err());
    }
}
