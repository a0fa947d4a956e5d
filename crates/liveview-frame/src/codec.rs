use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Part header: magic (2) + length (4) = 6 bytes.
pub const PART_HEADER_SIZE: usize = 6;

/// Magic bytes: "LV" (0x4C 0x56).
pub const MAGIC: [u8; 2] = [0x4C, 0x56];

/// Default maximum part size: 64 MiB (a 4k×4k float64 image fits twice over).
pub const DEFAULT_MAX_PART: usize = 64 * 1024 * 1024;

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum size of one message part in bytes. Default: 64 MiB.
    pub max_part_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_part_size: DEFAULT_MAX_PART,
        }
    }
}

/// Encode one message part into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬─────────────────┐
/// │ Magic (2B)   │ Length    │ Body             │
/// │ 0x4C 0x56    │ (4B LE)   │ (Length bytes)   │
/// │ "LV"         │           │                  │
/// └──────────────┴───────────┴─────────────────┘
/// ```
///
/// A frame message is exactly two consecutive parts: the JSON header
/// record, then the raw payload buffer.
pub fn encode_part(body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.len() > u32::MAX as usize {
        return Err(FrameError::PartTooLarge {
            size: body.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(PART_HEADER_SIZE + body.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(body.len() as u32);
    dst.put_slice(body);
    Ok(())
}

/// Inspect the part at `offset` without consuming anything.
///
/// Returns `(body_start, body_len)` once the part header is available, or
/// `None` if even the header has not fully arrived.
fn peek_part(src: &[u8], offset: usize, max_part: usize) -> Result<Option<(usize, usize)>> {
    if src.len() < offset + PART_HEADER_SIZE {
        return Ok(None);
    }

    if src[offset..offset + 2] != MAGIC {
        return Err(FrameError::InvalidMagic);
    }

    let len = u32::from_le_bytes(src[offset + 2..offset + PART_HEADER_SIZE].try_into().unwrap())
        as usize;
    if len > max_part {
        return Err(FrameError::PartTooLarge {
            size: len,
            max: max_part,
        });
    }

    Ok(Some((offset + PART_HEADER_SIZE, len)))
}

/// Decode one complete frame message (header part + payload part).
///
/// Returns `Ok(None)` until both parts are fully buffered; nothing is
/// consumed in that case, so a partial message survives to the next pass.
/// On success, consumes the message bytes and returns
/// `(header_bytes, payload_bytes)`.
pub fn decode_message(src: &mut BytesMut, max_part: usize) -> Result<Option<(Bytes, Bytes)>> {
    let Some((header_start, header_len)) = peek_part(src, 0, max_part)? else {
        return Ok(None);
    };
    let header_end = header_start + header_len;
    if src.len() < header_end {
        return Ok(None);
    }

    let Some((payload_start, payload_len)) = peek_part(src, header_end, max_part)? else {
        return Ok(None);
    };
    if src.len() < payload_start + payload_len {
        return Ok(None);
    }

    src.advance(PART_HEADER_SIZE);
    let header = src.split_to(header_len).freeze();
    src.advance(PART_HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some((header, payload)))
}
