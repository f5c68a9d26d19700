//! ITSF header (outer framing), spec §3 and §6.1.

use crate::error::{ChmError, Result};
use crate::unmarshal::Cursor;

pub const ITSF_V2_LEN: usize = 0x58;
pub const ITSF_V3_LEN: usize = 0x60;

#[derive(Debug, Clone)]
pub struct ItsfHeader {
    pub version: i32,
    pub header_len: i32,
    pub last_modified: u32,
    pub lang_id: u32,
    pub dir_uuid: [u8; 16],
    pub stream_uuid: [u8; 16],
    pub dir_offset: u64,
    pub dir_len: u64,
    pub data_offset: u64,
}

impl ItsfHeader {
    /// Parses the 0x60-byte ITSF header. Only the fields present for the
    /// archive's own version are consumed; v2 archives derive `data_offset`
    /// as `dir_offset + dir_len` instead of reading it.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(buf);
        let signature = c.bytes(4);
        if signature != b"ITSF" {
            return Err(ChmError::MalformedHeader("missing ITSF signature"));
        }
        let version = c.i32();
        let header_len = c.i32();
        let _reserved = c.i32();
        let last_modified = c.u32();
        let lang_id = c.u32();
        let dir_uuid = c.uuid();
        let stream_uuid = c.uuid();
        let _unknown_offset = c.u64();
        let _unknown_len = c.u64();
        let dir_offset = c.u64();
        let dir_len = c.u64();

        if version != 2 && version != 3 {
            return Err(ChmError::MalformedHeader("unsupported ITSF version"));
        }
        let data_offset = if version == 3 {
            c.u64()
        } else {
            dir_offset
                .checked_add(dir_len)
                .ok_or(ChmError::MalformedHeader("directory offset/length overflow"))?
        };

        if !c.ok() {
            return Err(ChmError::OutOfBounds);
        }
        if version == 2 && (header_len as usize) < ITSF_V2_LEN {
            return Err(ChmError::MalformedHeader("ITSF v2 header too short"));
        }
        if version == 3 && (header_len as usize) < ITSF_V3_LEN {
            return Err(ChmError::MalformedHeader("ITSF v3 header too short"));
        }
        // Sanity bound against corrupted files: these must fit comfortably
        // within a 32-bit archive size.
        if dir_offset > u32::MAX as u64 || dir_len > u32::MAX as u64 {
            return Err(ChmError::MalformedHeader("directory offset/length out of range"));
        }

        Ok(ItsfHeader {
            version,
            header_len,
            last_modified,
            lang_id,
            dir_uuid,
            stream_uuid,
            dir_offset,
            dir_len,
            data_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_v3(dir_offset: u64, dir_len: u64, data_offset: u64) -> Vec<u8> {
        let mut buf = vec![0u8; ITSF_V3_LEN];
        buf[0..4].copy_from_slice(b"ITSF");
        buf[4..8].copy_from_slice(&3i32.to_le_bytes());
        buf[8..12].copy_from_slice(&(ITSF_V3_LEN as i32).to_le_bytes());
        buf[0x48..0x50].copy_from_slice(&dir_offset.to_le_bytes());
        buf[0x50..0x58].copy_from_slice(&dir_len.to_le_bytes());
        buf[0x58..0x60].copy_from_slice(&data_offset.to_le_bytes());
        buf
    }

    #[test]
    fn parses_v3_header() {
        let buf = sample_v3(0x1000, 0x200, 0x1300);
        let hdr = ItsfHeader::parse(&buf).unwrap();
        assert_eq!(hdr.version, 3);
        assert_eq!(hdr.dir_offset, 0x1000);
        assert_eq!(hdr.dir_len, 0x200);
        assert_eq!(hdr.data_offset, 0x1300);
    }

    #[test]
    fn v2_derives_data_offset() {
        let mut buf = vec![0u8; ITSF_V2_LEN];
        buf[0..4].copy_from_slice(b"ITSF");
        buf[4..8].copy_from_slice(&2i32.to_le_bytes());
        buf[8..12].copy_from_slice(&(ITSF_V2_LEN as i32).to_le_bytes());
        buf[0x48..0x50].copy_from_slice(&0x1000u64.to_le_bytes());
        buf[0x50..0x58].copy_from_slice(&0x200u64.to_le_bytes());
        let hdr = ItsfHeader::parse(&buf).unwrap();
        assert_eq!(hdr.data_offset, 0x1200);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut buf = sample_v3(0, 0, 0);
        buf[0] = b'X';
        assert!(ItsfHeader::parse(&buf).is_err());
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut buf = sample_v3(0x1000, 0x200, 0x1300);
        buf[4..8].copy_from_slice(&4i32.to_le_bytes());
        assert!(ItsfHeader::parse(&buf).is_err());
    }
}
