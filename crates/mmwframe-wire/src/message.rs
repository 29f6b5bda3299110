use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, WireError};
use crate::tlv::TlvType;

/// Wire size of one detected-point record: four `f32` fields.
pub const POINT_LEN: usize = 16;
/// Wire size of one side-info record: two `i16` fields.
pub const SIDE_INFO_LEN: usize = 4;
/// Wire size of one complex heat-map sample: two `i16` fields.
pub const COMPLEX_LEN: usize = 4;
/// Wire size of the stats payload: six `u32` counters.
pub const STATS_LEN: usize = 24;
/// Wire size of the temperature payload: flag, timestamp, ten readings.
pub const TEMPERATURE_STATS_LEN: usize = 28;

/// One detected reflector in cartesian sensor coordinates (meters, m/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub velocity: f32,
}

/// Per-point SNR and noise, parallel-indexed to the detected points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideInfo {
    pub snr: i16,
    pub noise: i16,
}

/// Heat-map sample. The sensor transmits the imaginary part first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexSample {
    pub imag: i16,
    pub real: i16,
}

/// Processing-time and CPU-load counters reported once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub inter_frame_processing_time: u32,
    pub transmit_output_time: u32,
    pub inter_frame_processing_margin: u32,
    pub inter_chirp_processing_margin: u32,
    pub active_frame_cpu_load: u32,
    pub inter_frame_cpu_load: u32,
}

/// On-die temperature readings plus a validity flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemperatureStats {
    /// Zero when the report is valid, an error code otherwise.
    pub valid: i32,
    pub time: u32,
    pub rx: [u16; 4],
    pub tx: [u16; 3],
    pub power_management: u16,
    pub dig0: u16,
    pub dig1: u16,
}

/// A decoded TLV payload, tagged by message kind.
///
/// Heat maps are emitted as flat sample sequences in wire order; the grid
/// shape depends on the sensor configuration, which the byte stream does not
/// carry, so reshaping is left to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    DetectedPoints(Vec<DetectedPoint>),
    RangeProfile(Vec<u16>),
    NoiseProfile(Vec<u16>),
    AzimuthStaticHeatMap(Vec<ComplexSample>),
    RangeDopplerHeatMap(Vec<u16>),
    Stats(Stats),
    DetectedPointsSideInfo(Vec<SideInfo>),
    AzimuthElevationStaticHeatMap(Vec<ComplexSample>),
    TemperatureStats(TemperatureStats),
    /// A type code outside 1-9, passed through with its raw payload.
    Unknown { tlv_type: u32, payload: Bytes },
}

impl Message {
    /// Decode one TLV payload according to its wire type code.
    ///
    /// Pure and stateless. Unrecognized codes pass through as
    /// [`Message::Unknown`] rather than failing, so firmware newer than this
    /// crate never aborts a frame.
    pub fn decode(tlv_type: u32, payload: &[u8]) -> Result<Self> {
        let kind = TlvType::from_code(tlv_type);
        match kind {
            TlvType::DetectedPoints => Ok(Self::DetectedPoints(decode_points(payload)?)),
            TlvType::RangeProfile => Ok(Self::RangeProfile(decode_u16s(kind, payload)?)),
            TlvType::NoiseProfile => Ok(Self::NoiseProfile(decode_u16s(kind, payload)?)),
            TlvType::AzimuthStaticHeatMap => {
                Ok(Self::AzimuthStaticHeatMap(decode_complex(kind, payload)?))
            }
            TlvType::RangeDopplerHeatMap => Ok(Self::RangeDopplerHeatMap(decode_u16s(kind, payload)?)),
            TlvType::Stats => Ok(Self::Stats(decode_stats(payload)?)),
            TlvType::DetectedPointsSideInfo => {
                Ok(Self::DetectedPointsSideInfo(decode_side_info(payload)?))
            }
            TlvType::AzimuthElevationStaticHeatMap => Ok(Self::AzimuthElevationStaticHeatMap(
                decode_complex(kind, payload)?,
            )),
            TlvType::TemperatureStats => Ok(Self::TemperatureStats(decode_temperature(payload)?)),
            TlvType::Unknown(code) => Ok(Self::Unknown {
                tlv_type: code,
                payload: Bytes::copy_from_slice(payload),
            }),
        }
    }

    /// The message kind this variant corresponds to.
    pub fn kind(&self) -> TlvType {
        match self {
            Self::DetectedPoints(_) => TlvType::DetectedPoints,
            Self::RangeProfile(_) => TlvType::RangeProfile,
            Self::NoiseProfile(_) => TlvType::NoiseProfile,
            Self::AzimuthStaticHeatMap(_) => TlvType::AzimuthStaticHeatMap,
            Self::RangeDopplerHeatMap(_) => TlvType::RangeDopplerHeatMap,
            Self::Stats(_) => TlvType::Stats,
            Self::DetectedPointsSideInfo(_) => TlvType::DetectedPointsSideInfo,
            Self::AzimuthElevationStaticHeatMap(_) => TlvType::AzimuthElevationStaticHeatMap,
            Self::TemperatureStats(_) => TlvType::TemperatureStats,
            Self::Unknown { tlv_type, .. } => TlvType::Unknown(*tlv_type),
        }
    }

    /// Encode the payload bytes this message decodes from.
    pub fn encode_payload(&self, dst: &mut BytesMut) {
        match self {
            Self::DetectedPoints(points) => {
                dst.reserve(points.len() * POINT_LEN);
                for p in points {
                    dst.put_f32_le(p.x);
                    dst.put_f32_le(p.y);
                    dst.put_f32_le(p.z);
                    dst.put_f32_le(p.velocity);
                }
            }
            Self::RangeProfile(bins) | Self::NoiseProfile(bins) | Self::RangeDopplerHeatMap(bins) => {
                dst.reserve(bins.len() * 2);
                for bin in bins {
                    dst.put_u16_le(*bin);
                }
            }
            Self::AzimuthStaticHeatMap(samples) | Self::AzimuthElevationStaticHeatMap(samples) => {
                dst.reserve(samples.len() * COMPLEX_LEN);
                for s in samples {
                    dst.put_i16_le(s.imag);
                    dst.put_i16_le(s.real);
                }
            }
            Self::Stats(stats) => {
                dst.reserve(STATS_LEN);
                dst.put_u32_le(stats.inter_frame_processing_time);
                dst.put_u32_le(stats.transmit_output_time);
                dst.put_u32_le(stats.inter_frame_processing_margin);
                dst.put_u32_le(stats.inter_chirp_processing_margin);
                dst.put_u32_le(stats.active_frame_cpu_load);
                dst.put_u32_le(stats.inter_frame_cpu_load);
            }
            Self::DetectedPointsSideInfo(entries) => {
                dst.reserve(entries.len() * SIDE_INFO_LEN);
                for e in entries {
                    dst.put_i16_le(e.snr);
                    dst.put_i16_le(e.noise);
                }
            }
            Self::TemperatureStats(t) => {
                dst.reserve(TEMPERATURE_STATS_LEN);
                dst.put_i32_le(t.valid);
                dst.put_u32_le(t.time);
                for r in t.rx {
                    dst.put_u16_le(r);
                }
                for r in t.tx {
                    dst.put_u16_le(r);
                }
                dst.put_u16_le(t.power_management);
                dst.put_u16_le(t.dig0);
                dst.put_u16_le(t.dig1);
            }
            Self::Unknown { payload, .. } => {
                dst.extend_from_slice(payload);
            }
        }
    }

    /// Encode as a complete TLV block, sub-header included.
    pub fn encode(&self, dst: &mut BytesMut) {
        let mut payload = BytesMut::new();
        self.encode_payload(&mut payload);
        crate::tlv::encode_tlv(self.kind().code(), &payload, dst);
    }
}

fn record_count(kind: TlvType, payload: &[u8], record_len: usize) -> Result<usize> {
    if payload.len() % record_len != 0 {
        return Err(WireError::MalformedPayload {
            kind,
            len: payload.len(),
        });
    }
    Ok(payload.len() / record_len)
}

fn decode_points(payload: &[u8]) -> Result<Vec<DetectedPoint>> {
    let count = record_count(TlvType::DetectedPoints, payload, POINT_LEN)?;
    let mut buf = payload;
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        points.push(DetectedPoint {
            x: buf.get_f32_le(),
            y: buf.get_f32_le(),
            z: buf.get_f32_le(),
            velocity: buf.get_f32_le(),
        });
    }
    Ok(points)
}

fn decode_u16s(kind: TlvType, payload: &[u8]) -> Result<Vec<u16>> {
    let count = record_count(kind, payload, 2)?;
    let mut buf = payload;
    let mut bins = Vec::with_capacity(count);
    for _ in 0..count {
        bins.push(buf.get_u16_le());
    }
    Ok(bins)
}

fn decode_complex(kind: TlvType, payload: &[u8]) -> Result<Vec<ComplexSample>> {
    let count = record_count(kind, payload, COMPLEX_LEN)?;
    let mut buf = payload;
    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        samples.push(ComplexSample {
            imag: buf.get_i16_le(),
            real: buf.get_i16_le(),
        });
    }
    Ok(samples)
}

fn decode_side_info(payload: &[u8]) -> Result<Vec<SideInfo>> {
    let count = record_count(TlvType::DetectedPointsSideInfo, payload, SIDE_INFO_LEN)?;
    let mut buf = payload;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(SideInfo {
            snr: buf.get_i16_le(),
            noise: buf.get_i16_le(),
        });
    }
    Ok(entries)
}

fn decode_stats(payload: &[u8]) -> Result<Stats> {
    if payload.len() != STATS_LEN {
        return Err(WireError::MalformedPayload {
            kind: TlvType::Stats,
            len: payload.len(),
        });
    }
    let mut buf = payload;
    Ok(Stats {
        inter_frame_processing_time: buf.get_u32_le(),
        transmit_output_time: buf.get_u32_le(),
        inter_frame_processing_margin: buf.get_u32_le(),
        inter_chirp_processing_margin: buf.get_u32_le(),
        active_frame_cpu_load: buf.get_u32_le(),
        inter_frame_cpu_load: buf.get_u32_le(),
    })
}

fn decode_temperature(payload: &[u8]) -> Result<TemperatureStats> {
    if payload.len() != TEMPERATURE_STATS_LEN {
        return Err(WireError::MalformedPayload {
            kind: TlvType::TemperatureStats,
            len: payload.len(),
        });
    }
    let mut buf = payload;
    let valid = buf.get_i32_le();
    let time = buf.get_u32_le();
    let mut rx = [0u16; 4];
    for r in &mut rx {
        *r = buf.get_u16_le();
    }
    let mut tx = [0u16; 3];
    for t in &mut tx {
        *t = buf.get_u16_le();
    }
    Ok(TemperatureStats {
        valid,
        time,
        rx,
        tx,
        power_management: buf.get_u16_le(),
        dig0: buf.get_u16_le(),
        dig1: buf.get_u16_le(),
    })
}
