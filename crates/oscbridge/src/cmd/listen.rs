use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::errno::Errno;
use oscbridge_frame::DEFAULT_MAX_FRAMED;
use oscbridge_queue::{OscQueue, QueueError, DEFAULT_CAPACITY};

use crate::cmd::ListenArgs;
use crate::exit::{queue_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

/// Diagnostic tap: consumes messages the bridge would otherwise forward.
/// Not meant to run alongside `serve`; the queue has one reader.
pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let queue = OscQueue::open_read(&args.queue, DEFAULT_CAPACITY, DEFAULT_MAX_FRAMED)
        .map_err(|err| queue_error("queue open failed", err))?;
    let attrs = queue
        .attributes()
        .map_err(|err| queue_error("attribute fetch failed", err))?;
    let mut buf = vec![0u8; attrs.max_message_size];

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let len = match queue.receive(&mut buf) {
            Ok(len) => len,
            // Ctrl-C lands here as an interrupted receive; loop back to
            // re-check the flag.
            Err(QueueError::Receive {
                source: Errno::EINTR,
                ..
            }) => continue,
            Err(err) => return Err(queue_error("receive failed", err)),
        };

        print_message(&buf[..len], &args.queue, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
