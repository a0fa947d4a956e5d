use std::io::Write;
use std::time::Duration;

use tracing::{debug, info};

use liveview_frame::{Dtype, FrameWriter};
use liveview_transport::{Endpoint, PushListener};

use crate::error::{PipelineError, Result};
use crate::source::SyntheticSource;

/// Producer-side frame transmitter.
///
/// Wraps a [`FrameWriter`] and assigns outgoing frames their place in the
/// per-run sequence. At-most-once: a frame is encoded, written, and
/// forgotten.
pub struct FrameSender<T> {
    writer: FrameWriter<T>,
    frames_sent: u64,
}

impl<T: Write> FrameSender<T> {
    /// Create a sender over an established outbound stream.
    pub fn new(stream: T) -> Self {
        Self {
            writer: FrameWriter::new(stream),
            frames_sent: 0,
        }
    }

    /// Encode and transmit one frame.
    pub fn send_image(
        &mut self,
        sequence: u64,
        dtype: Dtype,
        shape: (u32, u32),
        payload: &[u8],
    ) -> Result<()> {
        self.writer.send(sequence, dtype, shape, payload)?;
        self.frames_sent += 1;
        debug!(sequence, ?shape, %dtype, bytes = payload.len(), "sent frame");
        Ok(())
    }

    /// Number of frames transmitted by this sender.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Consume the sender and return the underlying stream.
    pub fn into_inner(self) -> T {
        self.writer.into_inner()
    }
}

/// Fixed-interval pacing between sends.
///
/// Cooperative, not real-time: the sender sleeps `1/rate` after every
/// frame, so the achieved rate degrades with any send latency.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    /// Build a pacer from a rate in Hz.
    pub fn from_rate(rate_hz: f64) -> Result<Self> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(PipelineError::InvalidRate(rate_hz));
        }
        Ok(Self {
            interval: Duration::from_secs_f64(1.0 / rate_hz),
        })
    }

    /// The sleep interval between frames.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep one interval.
    pub fn pause(&self) {
        std::thread::sleep(self.interval);
    }
}

/// Configuration of a producer run, defaulting to the demo tool's values.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Endpoint URL to bind.
    pub endpoint: Endpoint,
    /// Number of frames to send.
    pub num_frames: u64,
    /// Rate to transmit frames at (Hz).
    pub rate_hz: f64,
    /// Image rows.
    pub rows: u32,
    /// Image columns.
    pub cols: u32,
    /// Minimum synthetic pixel value.
    pub val_min: u16,
    /// Maximum synthetic pixel value (inclusive).
    pub val_max: u16,
    /// Seed for reproducible frames; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::new("127.0.0.1", 5558),
            num_frames: 1,
            rate_hz: 1.0,
            rows: SyntheticSource::DEFAULT_ROWS,
            cols: SyntheticSource::DEFAULT_COLS,
            val_min: SyntheticSource::DEFAULT_VAL_MIN,
            val_max: SyntheticSource::DEFAULT_VAL_MAX,
            seed: None,
        }
    }
}

impl ProducerConfig {
    fn source(&self) -> SyntheticSource {
        match self.seed {
            Some(seed) => {
                SyntheticSource::with_seed(self.rows, self.cols, self.val_min, self.val_max, seed)
            }
            None => SyntheticSource::new(self.rows, self.cols, self.val_min, self.val_max),
        }
    }
}

/// Run one producer session: bind, wait for the viewer, stream frames.
///
/// Blocks until every frame is sent. Returns the number of frames
/// transmitted. A bind failure is fatal before anything is sent.
pub fn run_producer(config: &ProducerConfig) -> Result<u64> {
    let pacer = Pacer::from_rate(config.rate_hz)?;
    let listener = PushListener::bind(&config.endpoint)?;

    info!(
        frames = config.num_frames,
        rate_hz = config.rate_hz,
        "sending {} frames at {:.1} Hz",
        config.num_frames,
        config.rate_hz
    );

    let stream = listener.accept()?;
    let mut sender = FrameSender::new(stream);
    let mut source = config.source();

    for sequence in 0..config.num_frames {
        let payload = source.next_payload();
        sender.send_image(sequence, source.dtype(), source.shape(), &payload)?;
        pacer.pause();
    }

    Ok(sender.frames_sent())
}

#[cfg(test)]
mod tests {
    use super::*;

    use liveview_frame::FrameReader;

    #[test]
    fn sender_counts_and_sequences_frames() {
        let mut sender = FrameSender::new(Vec::new());
        let payload = vec![0u8; 2 * 2 * 2];

        sender.send_image(0, Dtype::Uint16, (2, 2), &payload).unwrap();
        sender.send_image(1, Dtype::Uint16, (2, 2), &payload).unwrap();
        assert_eq!(sender.frames_sent(), 2);

        let wire = sender.into_inner();
        let mut reader = FrameReader::new(std::io::Cursor::new(wire));
        assert_eq!(reader.read_frame().unwrap().sequence(), 0);
        assert_eq!(reader.read_frame().unwrap().sequence(), 1);
    }

    #[test]
    fn failed_send_does_not_count() {
        let mut sender = FrameSender::new(Vec::new());
        let err = sender.send_image(0, Dtype::Uint16, (2, 2), &[0u8; 3]);
        assert!(err.is_err());
        assert_eq!(sender.frames_sent(), 0);
    }

    #[test]
    fn pacer_interval_is_reciprocal_of_rate() {
        let pacer = Pacer::from_rate(10.0).unwrap();
        assert_eq!(pacer.interval(), Duration::from_millis(100));
    }

    #[test]
    fn pacer_rejects_unusable_rates() {
        assert!(matches!(
            Pacer::from_rate(0.0),
            Err(PipelineError::InvalidRate(_))
        ));
        assert!(matches!(
            Pacer::from_rate(-2.0),
            Err(PipelineError::InvalidRate(_))
        ));
        assert!(matches!(
            Pacer::from_rate(f64::INFINITY),
            Err(PipelineError::InvalidRate(_))
        ));
    }

    #[test]
    fn producer_config_defaults_match_demo_tool() {
        let config = ProducerConfig::default();
        assert_eq!(config.endpoint.to_string(), "tcp://127.0.0.1:5558");
        assert_eq!(config.num_frames, 1);
        assert_eq!(config.rate_hz, 1.0);
        assert_eq!((config.rows, config.cols), (256, 256));
        assert_eq!((config.val_min, config.val_max), (0, 4096));
    }
}
