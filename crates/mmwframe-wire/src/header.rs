use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, WireError};
use crate::tlv::TLV_HEADER_LEN;

/// Magic word opening every radar frame.
pub const MAGIC_WORD: [u8; 8] = [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07];

/// Header size on the wire: magic word plus eight `u32` fields.
pub const HEADER_LEN: usize = MAGIC_WORD.len() + 8 * 4;

/// Default maximum accepted total frame length: 64 KiB.
///
/// Well above anything current firmware emits; headers declaring more are
/// treated as corruption rather than buffered indefinitely.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// The fixed frame header following the magic word.
///
/// All fields are little-endian `u32` in this wire order. `total_packet_len`
/// counts the whole frame: magic word, header fields, and every TLV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u32,
    pub total_packet_len: u32,
    pub platform: u32,
    pub frame_number: u32,
    pub time_cpu_cycles: u32,
    pub num_detected_obj: u32,
    pub num_tlv: u32,
    pub sub_frame_number: u32,
}

impl FrameHeader {
    /// Decode a header from a buffer beginning at the magic word.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(WireError::InvalidHeader {
                reason: "buffer shorter than header",
            });
        }
        if buf[..MAGIC_WORD.len()] != MAGIC_WORD {
            return Err(WireError::InvalidHeader {
                reason: "missing magic word",
            });
        }
        let mut fields = &buf[MAGIC_WORD.len()..HEADER_LEN];
        Ok(Self {
            version: fields.get_u32_le(),
            total_packet_len: fields.get_u32_le(),
            platform: fields.get_u32_le(),
            frame_number: fields.get_u32_le(),
            time_cpu_cycles: fields.get_u32_le(),
            num_detected_obj: fields.get_u32_le(),
            num_tlv: fields.get_u32_le(),
            sub_frame_number: fields.get_u32_le(),
        })
    }

    /// Encode to wire form, magic word included.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(HEADER_LEN);
        dst.put_slice(&MAGIC_WORD);
        dst.put_u32_le(self.version);
        dst.put_u32_le(self.total_packet_len);
        dst.put_u32_le(self.platform);
        dst.put_u32_le(self.frame_number);
        dst.put_u32_le(self.time_cpu_cycles);
        dst.put_u32_le(self.num_detected_obj);
        dst.put_u32_le(self.num_tlv);
        dst.put_u32_le(self.sub_frame_number);
    }

    /// Structural validation before any payload byte is trusted.
    ///
    /// A header that fails here is rejected whole, never partially trusted.
    pub fn validate(&self, max_frame_len: usize) -> Result<()> {
        let total = self.total_packet_len as usize;
        if total < HEADER_LEN {
            return Err(WireError::InvalidHeader {
                reason: "total length shorter than header",
            });
        }
        if total > max_frame_len {
            return Err(WireError::InvalidHeader {
                reason: "total length exceeds configured maximum",
            });
        }
        if self.num_tlv == 0 && total > HEADER_LEN {
            return Err(WireError::InvalidHeader {
                reason: "zero TLVs but non-empty payload",
            });
        }
        if (self.num_tlv as usize).saturating_mul(TLV_HEADER_LEN) > total - HEADER_LEN {
            return Err(WireError::InvalidHeader {
                reason: "more TLVs than the payload can hold",
            });
        }
        Ok(())
    }

    /// Bytes of TLV payload following the header fields.
    pub fn payload_len(&self) -> usize {
        (self.total_packet_len as usize).saturating_sub(HEADER_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FrameHeader {
        FrameHeader {
            version: 0x0102_0304,
            total_packet_len: 64,
            platform: 0x000A_6843,
            frame_number: 1234,
            time_cpu_cycles: 987654,
            num_detected_obj: 1,
            num_tlv: 1,
            sub_frame_number: 0,
        }
    }

    #[test]
    fn roundtrip_is_byte_exact() {
        let header = sample();
        let mut wire = BytesMut::new();
        header.encode(&mut wire);
        assert_eq!(wire.len(), HEADER_LEN);

        let decoded = FrameHeader::decode(&wire).unwrap();
        assert_eq!(decoded, header);

        let mut again = BytesMut::new();
        decoded.encode(&mut again);
        assert_eq!(again, wire);
    }

    #[test]
    fn rejects_short_buffer() {
        let mut wire = BytesMut::new();
        sample().encode(&mut wire);
        let err = FrameHeader::decode(&wire[..HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, WireError::InvalidHeader { .. }));
    }

    #[test]
    fn rejects_missing_magic() {
        let mut wire = BytesMut::new();
        sample().encode(&mut wire);
        wire[0] ^= 0xFF;
        let err = FrameHeader::decode(&wire).unwrap_err();
        assert!(matches!(err, WireError::InvalidHeader { .. }));
    }

    #[test]
    fn validate_rejects_total_below_header() {
        let mut header = sample();
        header.total_packet_len = HEADER_LEN as u32 - 1;
        assert!(header.validate(DEFAULT_MAX_FRAME_LEN).is_err());
    }

    #[test]
    fn validate_rejects_oversized_total() {
        let mut header = sample();
        header.total_packet_len = DEFAULT_MAX_FRAME_LEN as u32 + 1;
        assert!(header.validate(DEFAULT_MAX_FRAME_LEN).is_err());
    }

    #[test]
    fn validate_rejects_zero_tlvs_with_payload() {
        let mut header = sample();
        header.num_tlv = 0;
        header.total_packet_len = HEADER_LEN as u32 + 8;
        assert!(header.validate(DEFAULT_MAX_FRAME_LEN).is_err());
    }

    #[test]
    fn validate_rejects_tlv_count_beyond_payload() {
        let mut header = sample();
        header.num_tlv = 100;
        header.total_packet_len = HEADER_LEN as u32 + 16;
        assert!(header.validate(DEFAULT_MAX_FRAME_LEN).is_err());
    }

    #[test]
    fn validate_accepts_bare_header() {
        let mut header = sample();
        header.num_tlv = 0;
        header.total_packet_len = HEADER_LEN as u32;
        assert!(header.validate(DEFAULT_MAX_FRAME_LEN).is_ok());
        assert_eq!(header.payload_len(), 0);
    }
}
