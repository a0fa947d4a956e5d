use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_message, FrameConfig};
use crate::error::{FrameError, Result};
use crate::image::ImageFrame;

const INITIAL_BUFFER_CAPACITY: usize = 64 * 1024;
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Reads complete frame messages from any `Read` stream.
///
/// Partial reads are buffered internally; callers only ever see whole
/// frames. The buffered/try split ([`fill`](Self::fill) +
/// [`try_read_frame`](Self::try_read_frame)) exists for the viewer's
/// non-blocking drain loop; [`read_frame`](Self::read_frame) is the
/// blocking convenience for streams without `O_NONBLOCK`.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Decode one complete frame from already-buffered bytes.
    ///
    /// Never touches the underlying stream. Returns `Ok(None)` when the
    /// buffer holds no complete message; a partial message is left in
    /// place for a later pass.
    pub fn try_read_frame(&mut self) -> Result<Option<ImageFrame>> {
        match decode_message(&mut self.buf, self.config.max_part_size)? {
            Some((header, payload)) => Ok(Some(ImageFrame::decode(header.as_ref(), payload)?)),
            None => Ok(None),
        }
    }

    /// Perform one read from the stream into the buffer.
    ///
    /// Returns the number of bytes read; `Ok(0)` means the read would
    /// have blocked (nothing buffered in the kernel right now). EOF is
    /// reported as `ConnectionClosed`.
    pub fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    trace!(bytes = n, buffered = self.buf.len(), "read stream data");
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<ImageFrame> {
        loop {
            if let Some(frame) = self.try_read_frame()? {
                return Ok(frame);
            }
            self.fill()?;
        }
    }

    /// Number of bytes currently buffered but not yet decoded.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
