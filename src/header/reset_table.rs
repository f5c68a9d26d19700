//! LZXC reset table summary (spec §3, §6.1).

use crate::error::{ChmError, Result};
use crate::unmarshal::Cursor;

pub const RESET_TABLE_LEN: usize = 0x28;

#[derive(Debug, Clone)]
pub struct ResetTable {
    pub block_count: u32,
    pub table_offset: u32,
    pub uncompressed_len: u64,
    pub compressed_len: u64,
    pub block_len: u64,
}

impl ResetTable {
    /// Parses the 0x28-byte reset table header. The `block_count` per-block
    /// offset entries that follow it live in the same entry's payload, read
    /// separately via [`crate::blockmap`].
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < RESET_TABLE_LEN {
            return Err(ChmError::MalformedHeader("LZXC reset table too short"));
        }
        let mut c = Cursor::new(buf);
        let version = c.u32();
        let block_count = c.u32();
        let _unknown = c.u32();
        let table_offset = c.u32();
        let uncompressed_len = c.i64();
        let compressed_len = c.i64();
        let block_len = c.i64();
        if !c.ok() {
            return Err(ChmError::OutOfBounds);
        }
        if version != 2 {
            return Err(ChmError::MalformedHeader("unsupported reset table version"));
        }
        if uncompressed_len < 0 || compressed_len < 0 {
            return Err(ChmError::MalformedHeader("reset table length negative"));
        }
        if uncompressed_len > u32::MAX as i64 || compressed_len > u32::MAX as i64 {
            return Err(ChmError::MalformedHeader("reset table length out of range"));
        }
        if block_len <= 0 || block_len > u32::MAX as i64 {
            return Err(ChmError::MalformedHeader("reset table block_len out of range"));
        }

        Ok(ResetTable {
            block_count,
            table_offset,
            uncompressed_len: uncompressed_len as u64,
            compressed_len: compressed_len as u64,
            block_len: block_len as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut buf = vec![0u8; RESET_TABLE_LEN];
        buf[0..4].copy_from_slice(&2u32.to_le_bytes());
        buf[4..8].copy_from_slice(&3u32.to_le_bytes());
        buf[0xc..0x10].copy_from_slice(&0x28u32.to_le_bytes());
        buf[0x10..0x18].copy_from_slice(&(0x18000i64).to_le_bytes());
        buf[0x18..0x20].copy_from_slice(&(0x9000i64).to_le_bytes());
        buf[0x20..0x28].copy_from_slice(&(0x8000i64).to_le_bytes());
        buf
    }

    #[test]
    fn parses_reset_table() {
        let rt = ResetTable::parse(&sample()).unwrap();
        assert_eq!(rt.block_count, 3);
        assert_eq!(rt.table_offset, 0x28);
        assert_eq!(rt.block_len, 0x8000);
    }

    #[test]
    fn rejects_wrong_version() {
        let mut buf = sample();
        buf[0..4].copy_from_slice(&1u32.to_le_bytes());
        assert!(ResetTable::parse(&buf).is_err());
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(ResetTable::parse(&[0u8; 10]).is_err());
    }
}
