use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::dtype::Dtype;
use crate::error::{FrameError, Result};

/// The metadata record sent ahead of every payload.
///
/// Field names are the wire schema; there is no version field. `shape`
/// serializes as a two-element array `[rows, cols]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    /// Sequence number, monotonically increasing per producer run.
    pub frame: u64,
    /// Element type of the payload.
    pub dtype: Dtype,
    /// Payload layout as (rows, cols), row-major.
    pub shape: (u32, u32),
}

impl FrameHeader {
    /// The payload length this header implies.
    pub fn expected_payload_len(&self) -> usize {
        let (rows, cols) = self.shape;
        rows as usize * cols as usize * self.dtype.element_size()
    }
}

/// One decoded image frame: header metadata plus the raw pixel buffer.
///
/// Construction always validates the §3 invariant: the payload length
/// must exactly equal `rows * cols * element_size(dtype)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    header: FrameHeader,
    payload: Bytes,
}

impl ImageFrame {
    /// Build a frame from an already-parsed header and payload.
    pub fn from_parts(header: FrameHeader, payload: Bytes) -> Result<Self> {
        let expected = header.expected_payload_len();
        if payload.len() != expected {
            return Err(FrameError::ShapeMismatch {
                expected,
                actual: payload.len(),
            });
        }
        Ok(Self { header, payload })
    }

    /// Decode a frame from its two wire parts.
    pub fn decode(header_bytes: &[u8], payload: Bytes) -> Result<Self> {
        let header: FrameHeader = serde_json::from_slice(header_bytes)?;
        Self::from_parts(header, payload)
    }

    /// Header metadata.
    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Sequence number assigned by the producer.
    pub fn sequence(&self) -> u64 {
        self.header.frame
    }

    /// Element type of the payload.
    pub fn dtype(&self) -> Dtype {
        self.header.dtype
    }

    /// (rows, cols) layout of the payload.
    pub fn shape(&self) -> (u32, u32) {
        self.header.shape
    }

    /// Raw pixel buffer, row-major, native little-endian elements.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Pixel value range for display scaling, or `None` for empty frames.
    ///
    /// Integer values wider than 53 bits lose precision in the f64
    /// conversion, which is acceptable for scaling a colormap.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        fn fold_range(bytes: &[u8], width: usize, convert: impl Fn(&[u8]) -> f64) -> Option<(f64, f64)> {
            let mut values = bytes.chunks_exact(width).map(convert);
            let first = values.next()?;
            Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
        }

        let b = self.payload.as_ref();
        match self.header.dtype {
            Dtype::Uint8 => fold_range(b, 1, |c| c[0] as f64),
            Dtype::Int8 => fold_range(b, 1, |c| c[0] as i8 as f64),
            Dtype::Uint16 => fold_range(b, 2, |c| u16::from_le_bytes([c[0], c[1]]) as f64),
            Dtype::Int16 => fold_range(b, 2, |c| i16::from_le_bytes([c[0], c[1]]) as f64),
            Dtype::Uint32 => {
                fold_range(b, 4, |c| u32::from_le_bytes(c.try_into().unwrap()) as f64)
            }
            Dtype::Int32 => fold_range(b, 4, |c| i32::from_le_bytes(c.try_into().unwrap()) as f64),
            Dtype::Uint64 => {
                fold_range(b, 8, |c| u64::from_le_bytes(c.try_into().unwrap()) as f64)
            }
            Dtype::Int64 => fold_range(b, 8, |c| i64::from_le_bytes(c.try_into().unwrap()) as f64),
            Dtype::Float32 => {
                fold_range(b, 4, |c| f32::from_le_bytes(c.try_into().unwrap()) as f64)
            }
            Dtype::Float64 => fold_range(b, 8, |c| f64::from_le_bytes(c.try_into().unwrap())),
        }
    }
}
