use bytes::{Buf, Bytes, BytesMut};
use tracing::{trace, warn};

use mmwframe_wire::{
    FrameHeader, Message, TlvWalker, WireError, DEFAULT_MAX_FRAME_LEN, HEADER_LEN, MAGIC_WORD,
};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Decoder configuration.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum accepted total frame length in bytes.
    ///
    /// Headers declaring more are rejected as corrupt instead of waiting
    /// forever for bytes that will never arrive.
    pub max_frame_len: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// One fully decoded frame: header plus TLV messages in wire order.
///
/// Immutable once emitted; the decoder keeps no reference to it and its
/// working buffer is reused for the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarFrame {
    pub header: FrameHeader,
    pub messages: Vec<Message>,
    /// Declared payload bytes left over after the final TLV. Some firmware
    /// pads frames; the count is surfaced for diagnostics.
    pub padding: usize,
}

/// Output of one [`FrameDecoder::poll`] step.
#[derive(Debug, Clone)]
pub enum DecodeEvent {
    /// A complete frame decoded successfully.
    Frame(RadarFrame),
    /// A candidate frame was structurally corrupt and has been skipped.
    ///
    /// `bytes` is a snapshot of what was inspected, for logging or capture.
    /// The decoder has already resumed scanning for the next magic word.
    Corrupt { error: WireError, bytes: Bytes },
}

/// Cumulative decode counters, readable at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Total bytes fed into the decoder.
    pub bytes_fed: u64,
    /// Bytes discarded while scanning for a magic word.
    pub garbage_bytes: u64,
    /// Frames decoded and emitted.
    pub frames_decoded: u64,
    /// Frame candidates rejected as corrupt.
    pub frames_rejected: u64,
}

/// Resynchronizing radar frame decoder.
///
/// Push bytes in with [`extend`](Self::extend) — in whatever chunking the
/// transport delivers them — and drain events with [`poll`](Self::poll)
/// until it returns `None`. The decoder owns a rolling buffer and survives
/// garbage prefixes, mid-frame starts, truncation, and corrupt frames by
/// scanning forward to the next magic word.
///
/// Internally a small state machine per frame: seeking the magic word,
/// awaiting the full header, then walking TLVs; any structural error drops
/// the in-flight frame only and returns to seeking.
pub struct FrameDecoder {
    buf: BytesMut,
    config: DecoderConfig,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            stats: DecoderStats::default(),
        }
    }

    /// Append transport bytes to the rolling buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.stats.bytes_fed += bytes.len() as u64;
        self.buf.extend_from_slice(bytes);
    }

    /// Decode the next event, or `None` when more bytes are needed.
    pub fn poll(&mut self) -> Option<DecodeEvent> {
        if !self.seek_magic() {
            return None;
        }
        if self.buf.len() < HEADER_LEN {
            return None;
        }

        let header = match FrameHeader::decode(&self.buf[..HEADER_LEN])
            .and_then(|h| h.validate(self.config.max_frame_len).map(|()| h))
        {
            Ok(header) => header,
            Err(error) => return Some(self.reject(HEADER_LEN, error)),
        };

        let total = header.total_packet_len as usize;
        if self.buf.len() < total {
            return None;
        }

        match assemble(&header, &self.buf[HEADER_LEN..total]) {
            Ok((messages, padding)) => {
                self.buf.advance(total);
                self.stats.frames_decoded += 1;
                trace!(
                    frame = header.frame_number,
                    tlvs = messages.len(),
                    total,
                    "frame decoded"
                );
                Some(DecodeEvent::Frame(RadarFrame {
                    header,
                    messages,
                    padding,
                }))
            }
            Err(error) => Some(self.reject(total, error)),
        }
    }

    /// Cumulative counters.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Current configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Bytes buffered but not yet consumed by a decoded frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop a corrupt candidate: snapshot its bytes for the consumer, then
    /// advance past the magic word so the same offset is never retried. The
    /// declared length cannot be trusted once the frame is inconsistent, so
    /// the remainder is left in the buffer for the scanner to re-examine.
    fn reject(&mut self, inspected: usize, error: WireError) -> DecodeEvent {
        let bytes = Bytes::copy_from_slice(&self.buf[..inspected]);
        self.buf.advance(MAGIC_WORD.len());
        self.stats.frames_rejected += 1;
        warn!(%error, inspected, "rejected corrupt frame candidate");
        DecodeEvent::Corrupt { error, bytes }
    }

    /// Scan for the magic word, discarding garbage ahead of it.
    ///
    /// Returns true when the buffer now begins at a match. When no match
    /// exists, keeps the last 7 bytes so a magic word split across reads
    /// still matches, which also bounds memory under sustained garbage.
    fn seek_magic(&mut self) -> bool {
        match find_magic(&self.buf) {
            Some(0) => true,
            Some(offset) => {
                self.discard(offset);
                true
            }
            None => {
                let keep = MAGIC_WORD.len() - 1;
                if self.buf.len() > keep {
                    let excess = self.buf.len() - keep;
                    self.discard(excess);
                }
                false
            }
        }
    }

    fn discard(&mut self, n: usize) {
        trace!(bytes = n, "discarding unframed bytes");
        self.stats.garbage_bytes += n as u64;
        self.buf.advance(n);
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn find_magic(buf: &[u8]) -> Option<usize> {
    buf.windows(MAGIC_WORD.len()).position(|w| w == MAGIC_WORD)
}

/// Walk every declared TLV and decode it. Returns the messages in wire
/// order plus the count of trailing padding bytes.
///
/// A payload that disagrees with its kind's record size fails the whole
/// frame: once the sensor's length bookkeeping is wrong, the remaining
/// block boundaries cannot be trusted either.
fn assemble(
    header: &FrameHeader,
    payload: &[u8],
) -> std::result::Result<(Vec<Message>, usize), WireError> {
    let mut walker = TlvWalker::new(payload, header.num_tlv);
    let mut messages = Vec::with_capacity(header.num_tlv as usize);
    for raw in walker.by_ref() {
        let raw = raw?;
        messages.push(Message::decode(raw.tlv_type, raw.payload)?);
    }
    Ok((messages, walker.padding()))
}
