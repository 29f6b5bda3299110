use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};

/// TLV sub-header size: type code (`u32` LE) + payload length (`u32` LE).
pub const TLV_HEADER_LEN: usize = 8;

/// Message type codes emitted by the sensor firmware.
///
/// Codes 1-9 are recognized; anything else maps to [`TlvType::Unknown`] so
/// newer firmware never aborts decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlvType {
    DetectedPoints,
    RangeProfile,
    NoiseProfile,
    AzimuthStaticHeatMap,
    RangeDopplerHeatMap,
    Stats,
    DetectedPointsSideInfo,
    AzimuthElevationStaticHeatMap,
    TemperatureStats,
    Unknown(u32),
}

impl TlvType {
    /// Map a wire type code to its message kind.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::DetectedPoints,
            2 => Self::RangeProfile,
            3 => Self::NoiseProfile,
            4 => Self::AzimuthStaticHeatMap,
            5 => Self::RangeDopplerHeatMap,
            6 => Self::Stats,
            7 => Self::DetectedPointsSideInfo,
            8 => Self::AzimuthElevationStaticHeatMap,
            9 => Self::TemperatureStats,
            other => Self::Unknown(other),
        }
    }

    /// The wire type code for this kind.
    pub fn code(self) -> u32 {
        match self {
            Self::DetectedPoints => 1,
            Self::RangeProfile => 2,
            Self::NoiseProfile => 3,
            Self::AzimuthStaticHeatMap => 4,
            Self::RangeDopplerHeatMap => 5,
            Self::Stats => 6,
            Self::DetectedPointsSideInfo => 7,
            Self::AzimuthElevationStaticHeatMap => 8,
            Self::TemperatureStats => 9,
            Self::Unknown(code) => code,
        }
    }
}

/// One TLV sliced out of a frame payload, not yet decoded.
#[derive(Debug, Clone, Copy)]
pub struct RawTlv<'a> {
    pub tlv_type: u32,
    pub payload: &'a [u8],
}

/// Finite, non-restartable iterator over the TLV blocks of one frame payload.
///
/// Yields exactly the declared TLV count, or stops at the first structural
/// error. `payload` must be the slice between the frame header and the
/// frame's declared end, so any overrun here is an overrun of the frame.
pub struct TlvWalker<'a> {
    payload: &'a [u8],
    cursor: usize,
    remaining: u32,
    failed: bool,
}

impl<'a> TlvWalker<'a> {
    pub fn new(payload: &'a [u8], num_tlv: u32) -> Self {
        Self {
            payload,
            cursor: 0,
            remaining: num_tlv,
            failed: false,
        }
    }

    /// Declared payload bytes left unwalked after the final TLV.
    ///
    /// Some firmware pads frames to an alignment boundary; the count is
    /// surfaced for diagnostics rather than treated as an error.
    pub fn padding(&self) -> usize {
        self.payload.len() - self.cursor
    }
}

impl<'a> Iterator for TlvWalker<'a> {
    type Item = Result<RawTlv<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        let rest = &self.payload[self.cursor..];
        if rest.len() < TLV_HEADER_LEN {
            self.failed = true;
            return Some(Err(WireError::TruncatedTlv {
                remaining: rest.len(),
                needed: TLV_HEADER_LEN,
            }));
        }
        let tlv_type = u32::from_le_bytes(rest[0..4].try_into().unwrap());
        let declared = u32::from_le_bytes(rest[4..8].try_into().unwrap()) as usize;
        let remaining = rest.len() - TLV_HEADER_LEN;
        if declared > remaining {
            self.failed = true;
            return Some(Err(WireError::OverrunTlv {
                tlv_type,
                declared,
                remaining,
            }));
        }
        let start = self.cursor + TLV_HEADER_LEN;
        self.cursor = start + declared;
        self.remaining -= 1;
        Some(Ok(RawTlv {
            tlv_type,
            payload: &self.payload[start..start + declared],
        }))
    }
}

/// Encode one TLV block (sub-header plus payload) onto `dst`.
pub fn encode_tlv(tlv_type: u32, payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(TLV_HEADER_LEN + payload.len());
    dst.put_u32_le(tlv_type);
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
}
