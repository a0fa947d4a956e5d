//! Element type tags carried in the frame header.
//!
//! Tags use the numpy-style spelling (`uint16`, `float64`, ...) so the
//! header stays readable by the tooling on either end of the wire. The
//! producer only ever emits `uint16` today; the decoder accepts the full
//! set.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FrameError;

/// Element type and width of a frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl Dtype {
    /// Size of one element in bytes.
    pub fn element_size(self) -> usize {
        match self {
            Dtype::Uint8 | Dtype::Int8 => 1,
            Dtype::Uint16 | Dtype::Int16 => 2,
            Dtype::Uint32 | Dtype::Int32 | Dtype::Float32 => 4,
            Dtype::Uint64 | Dtype::Int64 | Dtype::Float64 => 8,
        }
    }

    /// The wire tag for this dtype.
    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::Uint8 => "uint8",
            Dtype::Uint16 => "uint16",
            Dtype::Uint32 => "uint32",
            Dtype::Uint64 => "uint64",
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dtype {
    type Err = FrameError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "uint8" => Ok(Dtype::Uint8),
            "uint16" => Ok(Dtype::Uint16),
            "uint32" => Ok(Dtype::Uint32),
            "uint64" => Ok(Dtype::Uint64),
            "int8" => Ok(Dtype::Int8),
            "int16" => Ok(Dtype::Int16),
            "int32" => Ok(Dtype::Int32),
            "int64" => Ok(Dtype::Int64),
            "float32" => Ok(Dtype::Float32),
            "float64" => Ok(Dtype::Float64),
            other => Err(FrameError::UnknownDtype(other.to_string())),
        }
    }
}

impl Serialize for Dtype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dtype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse()
            .map_err(|_| D::Error::custom(format!("unknown dtype tag {tag:?}")))
    }
}
