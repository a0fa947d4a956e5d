use tracing::info;

use liveview_pipeline::{run_producer, ProducerConfig};
use liveview_transport::Endpoint;

use crate::cmd::ProduceArgs;
use crate::exit::{pipeline_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

pub fn run(args: ProduceArgs, _format: OutputFormat) -> CliResult<i32> {
    let endpoint: Endpoint = args
        .endpoint
        .parse()
        .map_err(|err| transport_error("invalid endpoint", err))?;

    if args.rows == 0 || args.cols == 0 {
        return Err(CliError::new(USAGE, "image shape must be non-empty"));
    }
    if args.val_min > args.val_max {
        return Err(CliError::new(USAGE, "--val-min must not exceed --val-max"));
    }

    let config = ProducerConfig {
        endpoint,
        num_frames: args.num_frames,
        rate_hz: args.rate,
        rows: args.rows,
        cols: args.cols,
        val_min: args.val_min,
        val_max: args.val_max,
        seed: args.seed,
    };

    let sent = run_producer(&config).map_err(|err| pipeline_error("produce failed", err))?;
    info!(frames = sent, "producer finished");

    Ok(SUCCESS)
}
