use std::io;
use std::time::Duration;

use liveview_transport::PollRead;

use crate::error::Result;
use crate::receiver::{DrainReport, FrameReceiver};
use crate::sink::FrameSink;

/// Viewer core: receiver, presentation sink, and display-side statistics.
///
/// Single-threaded by design — the host event loop calls
/// [`handle_readable`](Self::handle_readable) when the channel signals,
/// and [`reset_statistics`](Self::reset_statistics) strictly between
/// passes, so the counters need no synchronization.
pub struct Viewer<T: PollRead, S: FrameSink> {
    receiver: FrameReceiver<T>,
    sink: S,
    frames_shown: u64,
}

impl<T: PollRead, S: FrameSink> Viewer<T, S> {
    /// Assemble a viewer from a receiver and a registered sink.
    pub fn new(receiver: FrameReceiver<T>, sink: S) -> Self {
        Self {
            receiver,
            sink,
            frames_shown: 0,
        }
    }

    /// Run one drain pass and push results into the sink.
    ///
    /// Every decoded frame is forwarded through `on_frame` and counted as
    /// shown; a non-empty pass then publishes the updated counters via
    /// `on_stats_changed`. Frames delivered before a mid-pass decode
    /// error remain counted even though the error propagates.
    pub fn handle_readable(&mut self) -> Result<DrainReport> {
        let mut shown = 0u64;
        let result = {
            let sink = &mut self.sink;
            self.receiver.drain(|frame| {
                sink.on_frame(frame);
                shown += 1;
            })
        };
        self.frames_shown += shown;

        let report = result?;
        if !report.is_empty() {
            self.sink
                .on_stats_changed(self.receiver.frames_received(), self.frames_shown);
        }
        Ok(report)
    }

    /// Block up to `timeout` for channel readability.
    pub fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        self.receiver.wait_readable(timeout)
    }

    /// Zero both counters together (explicit user action) and publish the
    /// cleared values. Idempotent.
    pub fn reset_statistics(&mut self) {
        self.receiver.reset_statistics();
        self.frames_shown = 0;
        self.sink.on_stats_changed(0, 0);
    }

    /// Frames decoded off the wire since start or reset.
    pub fn frames_received(&self) -> u64 {
        self.receiver.frames_received()
    }

    /// Frames handed to the display since start or reset.
    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    /// Borrow the registered sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Borrow the underlying receiver.
    pub fn receiver(&self) -> &FrameReceiver<T> {
        &self.receiver
    }
}
