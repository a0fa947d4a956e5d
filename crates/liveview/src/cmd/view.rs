use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use liveview_frame::{FrameError, ImageFrame};
use liveview_pipeline::{FrameReceiver, FrameSink, PipelineError, Viewer};
use liveview_transport::{Endpoint, PullSocket, TransportError};

use crate::cmd::ViewArgs;
use crate::exit::{io_error, pipeline_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, print_stats, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Stand-in for the GUI presentation layer: prints each frame and keeps
/// the statistics visible through debug logging.
struct TerminalSink {
    format: OutputFormat,
}

impl FrameSink for TerminalSink {
    fn on_frame(&mut self, frame: &ImageFrame) {
        print_frame(frame, self.format);
    }

    fn on_stats_changed(&mut self, frames_received: u64, frames_shown: u64) {
        debug!(frames_received, frames_shown, "statistics updated");
    }
}

pub fn run(args: ViewArgs, format: OutputFormat) -> CliResult<i32> {
    let endpoint: Endpoint = args
        .endpoint
        .parse()
        .map_err(|err| transport_error("invalid endpoint", err))?;
    let connect_timeout = parse_duration(&args.connect_timeout)?;

    let socket = connect_with_retry(&endpoint, connect_timeout)
        .map_err(|err| transport_error("connect failed", err))?;
    let mut viewer = Viewer::new(FrameReceiver::new(socket), TerminalSink { format });

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    // Host event loop: wake on readability, drain, repeat. The finite
    // poll interval keeps Ctrl-C responsive.
    while running.load(Ordering::SeqCst) {
        let readable = viewer
            .wait_readable(Some(POLL_INTERVAL))
            .map_err(|err| io_error("poll failed", err))?;
        if !readable {
            continue;
        }

        match viewer.handle_readable() {
            Ok(_) => {}
            Err(PipelineError::Frame(FrameError::ConnectionClosed)) => {
                info!("producer closed the stream");
                break;
            }
            Err(err) => return Err(pipeline_error("receive failed", err)),
        }

        if let Some(count) = args.count {
            if viewer.frames_received() >= count {
                break;
            }
        }
    }

    print_stats(viewer.frames_received(), viewer.frames_shown(), format);
    Ok(SUCCESS)
}

fn connect_with_retry(
    endpoint: &Endpoint,
    timeout: Duration,
) -> Result<PullSocket, TransportError> {
    let deadline = Instant::now() + timeout;
    loop {
        match PullSocket::connect(endpoint) {
            Ok(socket) => return Ok(socket),
            Err(err) => {
                if Instant::now() >= deadline {
                    return Err(err);
                }
                std::thread::sleep(CONNECT_RETRY_DELAY);
            }
        }
    }
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
