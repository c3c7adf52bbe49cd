use clap::{Args, Subcommand};
use std::path::PathBuf;

use oscbridge_frame::DEFAULT_MAX_FRAMED;
use oscbridge_queue::DEFAULT_QUEUE_NAME;
use oscbridge_relay::DEFAULT_PORT;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod doctor;
pub mod listen;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bridge: forward queue messages to one TCP client at a time.
    Serve(ServeArgs),
    /// Enqueue a single payload (stand-in for the OSC producer).
    Send(SendArgs),
    /// Consume and print queue messages (diagnostic tap).
    Listen(ListenArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Send(args) => send::run(args),
        Command::Listen(args) => listen::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Message queue name (leading slash).
    #[arg(long, default_value = DEFAULT_QUEUE_NAME)]
    pub queue: String,
    /// Ceiling for a framed message (payload + terminator), in bytes.
    /// Must be at least the queue's max message size.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMED)]
    pub max_message_size: usize,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message queue name (leading slash).
    #[arg(long, default_value = DEFAULT_QUEUE_NAME)]
    pub queue: String,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Message priority.
    #[arg(long, default_value_t = 0)]
    pub priority: u32,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Message queue name (leading slash).
    #[arg(long, default_value = DEFAULT_QUEUE_NAME)]
    pub queue: String,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
