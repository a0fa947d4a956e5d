use std::io;
use std::time::Duration;

use tracing::{debug, warn};

use liveview_frame::{FrameConfig, FrameError, FrameReader, ImageFrame};
use liveview_transport::{Endpoint, PollRead, PullSocket};

use crate::error::Result;

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Frames decoded and delivered during the pass.
    pub frames_decoded: u64,
    /// Sequence number of the last frame decoded, if any.
    pub last_sequence: Option<u64>,
}

impl DrainReport {
    /// Whether the pass was a spurious wake (nothing decoded).
    pub fn is_empty(&self) -> bool {
        self.frames_decoded == 0
    }
}

/// Viewer-side frame receiver.
///
/// Owns the pull channel exclusively; the handle closes when the receiver
/// drops. The host event loop calls [`drain`](Self::drain) whenever the
/// channel becomes readable, and the receiver catches up to the entire
/// backlog in that single pass rather than one frame per wake-up.
pub struct FrameReceiver<T: PollRead> {
    reader: FrameReader<T>,
    frames_received: u64,
    last_sequence: Option<u64>,
}

#[cfg(unix)]
impl FrameReceiver<PullSocket> {
    /// Connect to a bound producer endpoint.
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        Ok(Self::new(PullSocket::connect(endpoint)?))
    }
}

impl<T: PollRead> FrameReceiver<T> {
    /// Create a receiver over a connected pull channel.
    pub fn new(source: T) -> Self {
        Self::with_config(source, FrameConfig::default())
    }

    /// Create a receiver with explicit codec configuration.
    pub fn with_config(source: T, config: FrameConfig) -> Self {
        Self {
            reader: FrameReader::with_config(source, config),
            frames_received: 0,
            last_sequence: None,
        }
    }

    /// Consume every frame currently buffered on the channel.
    ///
    /// Decodes already-buffered messages first, then keeps reading while
    /// the poll reports data pending, and returns as soon as nothing is
    /// left — never blocking the caller. Each decoded frame increments
    /// `frames_received` and is handed to `deliver` in arrival order.
    ///
    /// A decode failure aborts the pass: the transport cannot
    /// resynchronize inside a malformed message, so the error propagates
    /// after the frames decoded earlier in the pass have been delivered
    /// and counted. A partial message at the buffer tail is kept for the
    /// next pass. A spurious wake decodes nothing and mutates nothing.
    pub fn drain<F>(&mut self, mut deliver: F) -> Result<DrainReport>
    where
        F: FnMut(&ImageFrame),
    {
        let mut report = DrainReport::default();

        loop {
            while let Some(frame) = self.reader.try_read_frame()? {
                self.note_sequence(&frame);
                self.frames_received += 1;
                report.frames_decoded += 1;
                report.last_sequence = Some(frame.sequence());
                deliver(&frame);
            }

            if !self.poll_readable()? {
                break;
            }
            self.reader.fill()?;
        }

        if !report.is_empty() {
            debug!(
                frames = report.frames_decoded,
                total = self.frames_received,
                "drained channel"
            );
        }

        Ok(report)
    }

    /// Whether the channel has data pending right now.
    pub fn poll_readable(&self) -> Result<bool> {
        Ok(self
            .reader
            .get_ref()
            .poll_readable()
            .map_err(FrameError::Io)?)
    }

    /// Block up to `timeout` for channel readability (host-loop primitive).
    pub fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        // Bytes already buffered count as readable: a partial fill from a
        // previous pass must not strand a decodable frame.
        if self.reader.buffered_len() > 0 {
            return Ok(true);
        }
        self.reader.get_ref().wait_readable(timeout)
    }

    /// Frames decoded since construction or the last reset.
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// Zero the received-frame counter. Idempotent; sequence tracking is
    /// unaffected.
    pub fn reset_statistics(&mut self) {
        self.frames_received = 0;
    }

    /// Borrow the underlying channel.
    pub fn source(&self) -> &T {
        self.reader.get_ref()
    }

    /// Mutably borrow the underlying channel.
    pub fn source_mut(&mut self) -> &mut T {
        self.reader.get_mut()
    }

    fn note_sequence(&mut self, frame: &ImageFrame) {
        if let Some(last) = self.last_sequence {
            if frame.sequence() <= last {
                warn!(
                    sequence = frame.sequence(),
                    last, "frame sequence did not advance"
                );
            }
        }
        self.last_sequence = Some(frame.sequence());
    }
}
