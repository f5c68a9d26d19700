//! Per-block compressed-byte-range table, derived from the LZXC reset table
//! (spec §4.4).
//!
//! The reset table entry holds a fixed 0x28-byte header (parsed as
//! [`crate::header::ResetTable`]) followed by `block_count` little-endian
//! `u64` offsets, each relative to the start of the compressed content
//! stream. A block's compressed range runs from its offset to the next
//! block's offset, or to `compressed_len` for the last block.

use crate::error::{ChmError, Result};
use crate::header::ResetTable;
use crate::source::ByteSource;

#[derive(Debug, Clone)]
pub struct BlockMap {
    offsets: Vec<u64>,
    pub uncompressed_len: u64,
    pub compressed_len: u64,
    pub block_len: u64,
}

impl BlockMap {
    /// Reads the `block_count` offsets that follow `table` at
    /// `reset_table_entry_offset + table.table_offset`.
    pub fn read(
        source: &mut dyn ByteSource,
        table: &ResetTable,
        reset_table_entry_offset: u64,
    ) -> Result<Self> {
        if table.block_count == 0 {
            return Err(ChmError::MalformedHeader("reset table has zero blocks"));
        }
        let offsets_start = reset_table_entry_offset
            .checked_add(table.table_offset as u64)
            .ok_or(ChmError::MalformedHeader("reset table offset overflow"))?;

        let mut buf = vec![0u8; table.block_count as usize * 8];
        let n = source.read_at(&mut buf, offsets_start)?;
        if n < buf.len() {
            return Err(ChmError::ShortRead {
                offset: offsets_start,
                expected: buf.len(),
                actual: n,
            });
        }

        let offsets = buf
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
            .collect();

        Ok(BlockMap {
            offsets,
            uncompressed_len: table.uncompressed_len,
            compressed_len: table.compressed_len,
            block_len: table.block_len,
        })
    }

    pub fn block_count(&self) -> u64 {
        self.offsets.len() as u64
    }

    /// Returns the `[start, end)` byte range, relative to the compressed
    /// content stream, holding `block`'s compressed bytes. The last block's
    /// end is clipped to `compressed_len`.
    pub fn bounds(&self, block: u64) -> Result<(u64, u64)> {
        let idx = usize::try_from(block).map_err(|_| ChmError::OutOfBounds)?;
        let start = *self.offsets.get(idx).ok_or(ChmError::OutOfBounds)?;
        let end = match self.offsets.get(idx + 1) {
            Some(&next) => next,
            None => self.compressed_len,
        };
        if end < start {
            return Err(ChmError::MalformedHeader("block bounds end precedes start"));
        }
        Ok((start, end))
    }

    /// The number of uncompressed bytes produced by decoding `block`,
    /// clipped so the final block never reports more than
    /// `uncompressed_len - block * block_len` bytes remain.
    pub fn output_len(&self, block: u64) -> u64 {
        let produced_before = block.saturating_mul(self.block_len);
        self.uncompressed_len.saturating_sub(produced_before).min(self.block_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn table(block_count: u32, table_offset: u32, uncompressed_len: u64, compressed_len: u64, block_len: u64) -> ResetTable {
        ResetTable {
            block_count,
            table_offset,
            uncompressed_len,
            compressed_len,
            block_len,
        }
    }

    #[test]
    fn reads_offsets_and_computes_bounds() {
        let rt = table(3, 0x28, 0x18000, 0x9000, 0x8000);
        let mut data = vec![0u8; 0x28 + 3 * 8];
        data[0x28..0x30].copy_from_slice(&0u64.to_le_bytes());
        data[0x30..0x38].copy_from_slice(&0x3000u64.to_le_bytes());
        data[0x38..0x40].copy_from_slice(&0x6000u64.to_le_bytes());
        let mut source = MemorySource::new(data);
        let map = BlockMap::read(&mut source, &rt, 0).unwrap();
        assert_eq!(map.bounds(0).unwrap(), (0, 0x3000));
        assert_eq!(map.bounds(1).unwrap(), (0x3000, 0x6000));
        assert_eq!(map.bounds(2).unwrap(), (0x6000, 0x9000));
    }

    #[test]
    fn out_of_range_block_is_error() {
        let rt = table(1, 0x28, 0x8000, 0x4000, 0x8000);
        let mut data = vec![0u8; 0x28 + 8];
        data[0x28..0x30].copy_from_slice(&0u64.to_le_bytes());
        let mut source = MemorySource::new(data);
        let map = BlockMap::read(&mut source, &rt, 0).unwrap();
        assert!(map.bounds(1).is_err());
    }

    #[test]
    fn output_len_clips_final_block() {
        let rt = table(2, 0x28, 0xc000, 0x6000, 0x8000);
        let mut data = vec![0u8; 0x28 + 2 * 8];
        data[0x28..0x30].copy_from_slice(&0u64.to_le_bytes());
        data[0x30..0x38].copy_from_slice(&0x3000u64.to_le_bytes());
        let mut source = MemorySource::new(data);
        let map = BlockMap::read(&mut source, &rt, 0).unwrap();
        assert_eq!(map.output_len(0), 0x8000);
        assert_eq!(map.output_len(1), 0x4000);
    }
}
