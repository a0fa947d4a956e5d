/// Errors that can occur while encoding or decoding frame messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A message part does not start with the expected magic bytes.
    #[error("invalid part magic (expected 0x4C56 \"LV\")")]
    InvalidMagic,

    /// A message part exceeds the configured maximum size.
    #[error("message part too large ({size} bytes, max {max})")]
    PartTooLarge { size: usize, max: usize },

    /// The frame header record could not be parsed.
    #[error("malformed frame header: {0}")]
    Header(#[from] serde_json::Error),

    /// The header carries a dtype tag this codec does not know.
    #[error("unknown dtype tag {0:?}")]
    UnknownDtype(String),

    /// Payload length disagrees with the header's shape and dtype.
    #[error("payload/shape mismatch (expected {expected} bytes, got {actual})")]
    ShapeMismatch { expected: usize, actual: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection closed before a complete frame was transferred.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
