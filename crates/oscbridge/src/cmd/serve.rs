use nix::sys::signal::{signal, SigHandler, Signal};
use oscbridge_queue::{OscQueue, DEFAULT_CAPACITY};
use oscbridge_relay::{Relay, RelayConfig, RelayListener};

use crate::cmd::ServeArgs;
use crate::exit::{queue_error, relay_error, CliError, CliResult, INTERNAL, SUCCESS};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    ignore_sigpipe()?;

    let queue = OscQueue::open_read(&args.queue, DEFAULT_CAPACITY, args.max_message_size)
        .map_err(|err| queue_error("queue open failed", err))?;
    let listener =
        RelayListener::bind(args.port).map_err(|err| relay_error("bind failed", err))?;

    let config = RelayConfig {
        max_framed_size: args.max_message_size,
        ..RelayConfig::default()
    };

    Relay::new(listener, queue, config)
        .run()
        .map_err(|err| relay_error("relay failed", err))?;

    Ok(SUCCESS)
}

/// Broken-pipe conditions must surface as write failures on the socket,
/// not as a process-killing signal.
fn ignore_sigpipe() -> CliResult<()> {
    // SAFETY: SIG_IGN installs no handler code; this changes the
    // process-wide disposition once, before any connection exists.
    unsafe { signal(Signal::SIGPIPE, SigHandler::SigIgn) }
        .map(|_| ())
        .map_err(|err| CliError::new(INTERNAL, format!("signal setup failed: {err}")))
}
