//! Wire codec for live-view image frames.
//!
//! Every frame travels as a two-part message: a small JSON header record
//! (`{"frame": n, "dtype": tag, "shape": [rows, cols]}`) followed by the
//! raw pixel buffer, uncompressed and unchecksummed. Each part is framed
//! with:
//! - A 2-byte magic number ("LV") for stream sanity checking
//! - A 4-byte little-endian part length
//!
//! The header schema is implicit and fixed; there is no version field.
//! A payload whose length disagrees with `shape` × element size is a
//! decode error, as is an unrecognized dtype tag — the transport offers
//! no way to resynchronize inside a malformed message.

pub mod codec;
pub mod dtype;
pub mod error;
pub mod image;
pub mod reader;
pub mod writer;

pub use codec::{decode_message, encode_part, FrameConfig, DEFAULT_MAX_PART, MAGIC, PART_HEADER_SIZE};
pub use dtype::Dtype;
pub use error::{FrameError, Result};
pub use image::{FrameHeader, ImageFrame};
pub use reader::FrameReader;
pub use writer::FrameWriter;
