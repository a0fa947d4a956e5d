use clap::{Args, Subcommand};

use liveview_transport::DEFAULT_ENDPOINT;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod produce;
pub mod version;
pub mod view;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate synthetic detector frames and push them to a viewer.
    Produce(ProduceArgs),
    /// Pull frames from a producer and print them as they arrive.
    View(ViewArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Produce(args) => produce::run(args, format),
        Command::View(args) => view::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ProduceArgs {
    /// Number of frames to send.
    #[arg(long = "frames", short = 'n', value_name = "N", default_value_t = 1)]
    pub num_frames: u64,

    /// Rate to transmit frames at (Hz).
    #[arg(long, short = 'r', default_value_t = 1.0)]
    pub rate: f64,

    /// Endpoint URL to bind.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Image rows.
    #[arg(long, default_value_t = 256)]
    pub rows: u32,

    /// Image columns.
    #[arg(long, default_value_t = 256)]
    pub cols: u32,

    /// Minimum synthetic pixel value.
    #[arg(long, default_value_t = 0)]
    pub val_min: u16,

    /// Maximum synthetic pixel value (inclusive).
    #[arg(long, default_value_t = 4096)]
    pub val_max: u16,

    /// Seed the image generator for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Endpoint URL to connect to.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Exit after receiving N frames.
    #[arg(long, value_name = "N")]
    pub count: Option<u64>,

    /// How long to keep retrying the initial connect (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub connect_timeout: String,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {}
