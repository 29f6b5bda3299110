use std::io::{ErrorKind, Read};

use tracing::debug;

use crate::decoder::{DecodeEvent, DecoderConfig, DecoderStats, FrameDecoder, RadarFrame};
use crate::error::{DecodeError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Drives a [`FrameDecoder`] from any blocking `Read` byte source.
///
/// Works unchanged over a serial port handle, a socket adapter, or an
/// in-memory cursor; partial reads and resynchronization are handled
/// internally so callers only ever see whole events. One reader per
/// connection — the decoder's buffer state lives here across reads.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
}

impl<T: Read> FrameReader<T> {
    /// Create a frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, DecoderConfig::default())
    }

    /// Create a frame reader with explicit configuration.
    pub fn with_config(inner: T, config: DecoderConfig) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::with_config(config),
        }
    }

    /// Read until the next decode event (blocking).
    ///
    /// Corrupt frames are surfaced as events, in arrival order, so the
    /// caller can log them. Returns `Err(DecodeError::ConnectionClosed)`
    /// at end of stream; transport I/O errors pass through unchanged.
    pub fn read_event(&mut self) -> Result<DecodeEvent> {
        loop {
            if let Some(event) = self.decoder.poll() {
                return Ok(event);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DecodeError::Io(err)),
            };

            if read == 0 {
                return Err(DecodeError::ConnectionClosed);
            }

            self.decoder.extend(&chunk[..read]);
        }
    }

    /// Read until the next successfully decoded frame, skipping corrupt ones.
    pub fn read_frame(&mut self) -> Result<RadarFrame> {
        loop {
            match self.read_event()? {
                DecodeEvent::Frame(frame) => return Ok(frame),
                DecodeEvent::Corrupt { error, bytes } => {
                    debug!(%error, len = bytes.len(), "skipping corrupt frame");
                }
            }
        }
    }

    /// Cumulative decoder counters.
    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Borrow the underlying byte source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying byte source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner byte source.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;
    use mmwframe_wire::{DetectedPoint, FrameHeader, Message, HEADER_LEN};

    use super::*;

    fn frame_bytes(frame_number: u32, messages: &[Message]) -> BytesMut {
        let mut payload = BytesMut::new();
        for m in messages {
            m.encode(&mut payload);
        }
        let header = FrameHeader {
            version: 0x0306_0000,
            total_packet_len: (HEADER_LEN + payload.len()) as u32,
            platform: 0x000A_6843,
            frame_number,
            time_cpu_cycles: 0,
            num_detected_obj: 0,
            num_tlv: messages.len() as u32,
            sub_frame_number: 0,
        };
        let mut wire = BytesMut::new();
        header.encode(&mut wire);
        wire.extend_from_slice(&payload);
        wire
    }

    fn profile() -> Message {
        Message::RangeProfile(vec![10, 20, 30, 40])
    }

    #[test]
    fn reads_frames_in_order() {
        let mut wire = BytesMut::new();
        wire.extend_from_slice(&frame_bytes(1, &[profile()]));
        wire.extend_from_slice(&frame_bytes(2, &[profile()]));
        wire.extend_from_slice(&frame_bytes(3, &[profile()]));

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        for expected in 1..=3u32 {
            let frame = reader.read_frame().unwrap();
            assert_eq!(frame.header.frame_number, expected);
        }
    }

    #[test]
    fn byte_by_byte_source_yields_same_frame() {
        let wire = frame_bytes(
            4,
            &[Message::DetectedPoints(vec![DetectedPoint {
                x: 1.0,
                y: 2.0,
                z: 0.0,
                velocity: 0.5,
            }])],
        );

        let mut whole = FrameReader::new(Cursor::new(wire.to_vec()));
        let expected = whole.read_frame().unwrap();

        let mut trickled = FrameReader::new(OneByteReader {
            bytes: wire.to_vec(),
            pos: 0,
        });
        assert_eq!(trickled.read_frame().unwrap(), expected);
    }

    #[test]
    fn connection_closed_at_eof() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_event().unwrap_err();
        assert!(matches!(err, DecodeError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let wire = frame_bytes(5, &[profile()]);
        let mut reader = FrameReader::new(Cursor::new(wire[..wire.len() - 3].to_vec()));
        let err = reader.read_event().unwrap_err();
        assert!(matches!(err, DecodeError::ConnectionClosed));
    }

    #[test]
    fn interrupted_read_retries() {
        let wire = frame_bytes(6, &[profile()]);
        let mut reader = FrameReader::new(InterruptedThenData {
            interrupted: false,
            bytes: wire.to_vec(),
            pos: 0,
        });
        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.header.frame_number, 6);
    }

    #[test]
    fn read_frame_skips_corrupt_frames() {
        let mut bad = frame_bytes(7, &[profile()]);
        // declared TLV length larger than the remaining payload
        let tlv_len_at = HEADER_LEN + 4;
        bad[tlv_len_at..tlv_len_at + 4].copy_from_slice(&10_000u32.to_le_bytes());

        let mut wire = BytesMut::new();
        wire.extend_from_slice(&bad);
        wire.extend_from_slice(&frame_bytes(8, &[profile()]));

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.header.frame_number, 8);
        assert_eq!(reader.stats().frames_rejected, 1);
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    struct OneByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for OneByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
