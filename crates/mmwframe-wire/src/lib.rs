//! Wire format for TI-style mmWave radar frames.
//!
//! Every frame the sensor emits is:
//! - An 8-byte magic word for stream synchronization
//! - A 40-byte header (magic included) with eight little-endian `u32` fields
//! - `num_tlv` self-describing TLV blocks
//!
//! This crate owns the byte-exact layer: header codec, TLV walking, and the
//! typed message decoders with matching encoders. It performs no I/O and
//! holds no stream state; the resynchronizing engine lives in `mmwframe`.

pub mod error;
pub mod header;
pub mod message;
pub mod tlv;

pub use error::{Result, WireError};
pub use header::{FrameHeader, DEFAULT_MAX_FRAME_LEN, HEADER_LEN, MAGIC_WORD};
pub use message::{
    ComplexSample, DetectedPoint, Message, SideInfo, Stats, TemperatureStats, COMPLEX_LEN,
    POINT_LEN, SIDE_INFO_LEN, STATS_LEN, TEMPERATURE_STATS_LEN,
};
pub use tlv::{encode_tlv, RawTlv, TlvType, TlvWalker, TLV_HEADER_LEN};
