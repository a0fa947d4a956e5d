use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_part, FrameConfig};
use crate::dtype::Dtype;
use crate::error::{FrameError, Result};
use crate::image::{FrameHeader, ImageFrame};

const INITIAL_BUFFER_CAPACITY: usize = 64 * 1024;

/// Writes complete frame messages to any `Write` stream.
///
/// Each frame goes out as two parts — the JSON header record, then the
/// raw payload — in a single buffered write followed by a flush.
/// Send-and-forget: no acknowledgment is awaited.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and transmit one frame.
    ///
    /// The payload length is validated against `shape` and `dtype` before
    /// a single byte is written, so a rejected frame leaves the stream
    /// clean.
    pub fn send(&mut self, sequence: u64, dtype: Dtype, shape: (u32, u32), payload: &[u8]) -> Result<()> {
        let header = FrameHeader {
            frame: sequence,
            dtype,
            shape,
        };

        let expected = header.expected_payload_len();
        if payload.len() != expected {
            return Err(FrameError::ShapeMismatch {
                expected,
                actual: payload.len(),
            });
        }
        if payload.len() > self.config.max_part_size {
            return Err(FrameError::PartTooLarge {
                size: payload.len(),
                max: self.config.max_part_size,
            });
        }

        let header_json = serde_json::to_vec(&header)?;

        self.buf.clear();
        encode_part(&header_json, &mut self.buf)?;
        encode_part(payload, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Retransmit an already-decoded frame (forwarding path).
    pub fn write_frame(&mut self, frame: &ImageFrame) -> Result<()> {
        self.send(
            frame.sequence(),
            frame.dtype(),
            frame.shape(),
            frame.payload().as_ref(),
        )
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::Bytes;

    use super::*;
    use crate::reader::FrameReader;

    fn pixels_u16(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn written_frame_decodes_back() {
        let payload = pixels_u16(&[512, 7, 4096, 100]);
        let mut writer = FrameWriter::new(Vec::new());
        writer.send(42, Dtype::Uint16, (2, 2), &payload).unwrap();

        let mut reader = FrameReader::new(Cursor::new(writer.into_inner()));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.sequence(), 42);
        assert_eq!(frame.dtype(), Dtype::Uint16);
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(frame.payload().as_ref(), payload.as_slice());
    }

    #[test]
    fn shape_mismatch_rejected_before_writing() {
        let mut writer = FrameWriter::new(Vec::new());
        let err = writer
            .send(0, Dtype::Uint16, (2, 2), &[0u8; 7])
            .unwrap_err();

        assert!(matches!(
            err,
            FrameError::ShapeMismatch {
                expected: 8,
                actual: 7
            }
        ));
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn payload_over_config_limit_rejected() {
        let cfg = FrameConfig { max_part_size: 8 };
        let mut writer = FrameWriter::with_config(Vec::new(), cfg);

        let err = writer
            .send(0, Dtype::Uint16, (2, 4), &[0u8; 16])
            .unwrap_err();
        assert!(matches!(err, FrameError::PartTooLarge { size: 16, max: 8 }));
    }

    #[test]
    fn write_frame_forwards_decoded_frame() {
        let payload = pixels_u16(&[1, 2, 3]);
        let frame = ImageFrame::decode(
            br#"{"frame": 9, "dtype": "uint16", "shape": [1, 3]}"#,
            Bytes::from(payload.clone()),
        )
        .unwrap();

        let mut writer = FrameWriter::new(Vec::new());
        writer.write_frame(&frame).unwrap();

        let mut reader = FrameReader::new(Cursor::new(writer.into_inner()));
        let copied = reader.read_frame().unwrap();
        assert_eq!(copied, frame);
    }

    #[test]
    fn zero_length_write_is_connection_closed() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(0, Dtype::Uint8, (1, 1), &[5]).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn interrupted_write_and_flush_retry() {
        let mut writer = FrameWriter::new(InterruptedWriter {
            write_tripped: false,
            flush_tripped: false,
            data: Vec::new(),
        });

        writer.send(1, Dtype::Uint8, (1, 2), &[1, 2]).unwrap();
        assert!(!writer.into_inner().data.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_socket_pair() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        let payload = pixels_u16(&[9, 8, 7, 6]);
        writer.send(3, Dtype::Uint16, (2, 2), &payload).unwrap();

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.sequence(), 3);
        assert_eq!(frame.payload().as_ref(), payload.as_slice());
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptedWriter {
        write_tripped: bool,
        flush_tripped: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.write_tripped {
                self.write_tripped = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_tripped {
                self.flush_tripped = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }
}
