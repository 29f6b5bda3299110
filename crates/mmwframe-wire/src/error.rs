use crate::tlv::TlvType;

/// Structural errors found inside a frame's bytes.
///
/// These never abort a decode loop; the engine reports them per frame and
/// resynchronizes on the next magic word.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WireError {
    /// The frame header fields are internally inconsistent.
    #[error("invalid frame header: {reason}")]
    InvalidHeader { reason: &'static str },

    /// A TLV sub-header was cut off by the end of the frame payload.
    #[error("truncated TLV sub-header ({remaining} bytes remain of {needed} needed)")]
    TruncatedTlv { remaining: usize, needed: usize },

    /// A TLV's declared payload length extends past the frame's declared end.
    #[error("TLV overruns frame (type {tlv_type}, declared {declared} bytes, {remaining} remain)")]
    OverrunTlv {
        tlv_type: u32,
        declared: usize,
        remaining: usize,
    },

    /// A TLV payload length disagrees with the record size of its kind.
    #[error("malformed {kind:?} payload ({len} bytes)")]
    MalformedPayload { kind: TlvType, len: usize },
}

pub type Result<T> = std::result::Result<T, WireError>;
