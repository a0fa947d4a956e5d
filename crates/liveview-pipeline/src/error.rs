use liveview_frame::FrameError;
use liveview_transport::TransportError;

/// Errors surfaced by the producer and viewer cores.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A transport operation failed (bind, connect, accept).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded, decoded, or transferred.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The requested frame rate is not usable for pacing.
    #[error("invalid frame rate {0} Hz (must be finite and positive)")]
    InvalidRate(f64),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
