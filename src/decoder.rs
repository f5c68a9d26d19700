//! Sequential decoder driver: bridges the archive's random-access retrieval
//! to LZX's strictly sequential decoding (spec §4.5).
//!
//! Decoding block `N` requires replaying every block since the last reset
//! point, because the LZX window carries history forward across blocks. To
//! avoid replaying from the reset point on every call, the driver remembers
//! the last block it actually decoded and resumes from there when the
//! request continues forward within the same reset interval — otherwise it
//! falls back to replaying from the reset point. This mirrors
//! `uncompress_block`/`_chm_decompress_block` in the libchm reference.

use crate::blockmap::BlockMap;
use crate::cache::BlockCache;
use crate::error::{ChmError, Result};
use crate::lzx::LzxEngine;
use crate::source::ByteSource;

pub struct Decoder<E: LzxEngine> {
    engine: E,
    cache: BlockCache,
    blockmap: BlockMap,
    content_start: u64,
    window_size: u32,
    reset_blkcount: u64,
    last_block: Option<u64>,
}

impl<E: LzxEngine> Decoder<E> {
    pub fn new(
        engine: E,
        cache: BlockCache,
        blockmap: BlockMap,
        content_start: u64,
        window_size: u32,
        reset_blkcount: u32,
    ) -> Self {
        Decoder {
            engine,
            cache,
            blockmap,
            content_start,
            window_size,
            reset_blkcount: reset_blkcount.max(1) as u64,
            last_block: None,
        }
    }

    pub fn set_cache_capacity(&mut self, capacity: usize) {
        self.cache.resize(capacity);
    }

    /// Returns the decompressed bytes for `block`, decoding (and replaying
    /// any necessary preceding blocks) only if it isn't already cached.
    pub fn block(&mut self, source: &mut dyn ByteSource, block: u64) -> Result<Vec<u8>> {
        if block >= self.blockmap.block_count() {
            return Err(ChmError::OutOfBounds);
        }
        if let Some(cached) = self.cache.get(block) {
            return Ok(cached.to_vec());
        }

        let reset_base = block - block % self.reset_blkcount;
        let resume_from_memo = match self.last_block {
            Some(last) if last < block && last >= reset_base => Some(last + 1),
            _ => None,
        };
        let start_block = resume_from_memo.unwrap_or(reset_base);

        if start_block == reset_base {
            log::trace!("LZX reset at block {reset_base}");
            self.engine.reset(self.window_size)?;
        }

        let mut result = None;
        for b in start_block..=block {
            let (cstart, cend) = self.blockmap.bounds(b)?;
            let len = usize::try_from(cend - cstart).map_err(|_| ChmError::OutOfBounds)?;
            let mut compressed = vec![0u8; len];
            let offset = self.content_start + cstart;
            let n = source.read_at(&mut compressed, offset)?;
            if n < len {
                return Err(ChmError::ShortRead {
                    offset,
                    expected: len,
                    actual: n,
                });
            }

            let expected_len = usize::try_from(self.blockmap.output_len(b)).map_err(|_| ChmError::OutOfBounds)?;
            let out = self.engine.decompress_chunk(&compressed, expected_len)?;
            self.last_block = Some(b);
            // Every block replayed to reach `block` is itself a valid decode
            // result and gets cached too, not just the one actually requested.
            self.cache.insert(b, out.clone());
            if b == block {
                result = Some(out);
            }
        }

        result.ok_or(ChmError::OutOfBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::ResetTable;
    use crate::source::MemorySource;

    /// A fake engine that just counts how many times each block's chunk was
    /// fed to it and "decodes" by returning `expected_len` bytes derived
    /// deterministically from the chunk's first byte. This lets tests verify
    /// replay counts without needing real LZXD bitstreams.
    struct CountingEngine {
        resets: usize,
        feeds: Vec<u8>, // first byte of each chunk fed, in order
    }

    impl CountingEngine {
        fn new() -> Self {
            CountingEngine { resets: 0, feeds: Vec::new() }
        }
    }

    impl LzxEngine for CountingEngine {
        fn reset(&mut self, _window_size: u32) -> Result<()> {
            self.resets += 1;
            self.feeds.clear();
            Ok(())
        }

        fn decompress_chunk(&mut self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
            self.feeds.push(compressed[0]);
            Ok(vec![compressed[0]; expected_len])
        }
    }

    fn blockmap(block_count: u32, block_len: u64) -> (MemorySource, BlockMap) {
        let rt = ResetTable {
            block_count,
            table_offset: 0x28,
            uncompressed_len: block_count as u64 * block_len,
            compressed_len: block_count as u64 * 4, // 4 compressed bytes/block in this fixture
            block_len,
        };
        let mut data = vec![0u8; 0x28 + block_count as usize * 8];
        for i in 0..block_count as u64 {
            let off = 0x28 + i as usize * 8;
            data[off..off + 8].copy_from_slice(&(i * 4).to_le_bytes());
        }
        let mut source = MemorySource::new(data);
        let map = BlockMap::read(&mut source, &rt, 0).unwrap();
        (source, map)
    }

    fn content_source(block_count: u64) -> MemorySource {
        let mut data = Vec::new();
        for b in 0..block_count {
            data.extend_from_slice(&[b as u8; 4]);
        }
        MemorySource::new(data)
    }

    #[test]
    fn decodes_single_block_from_reset() {
        let (_bm_src, map) = blockmap(2, 16);
        let mut content = content_source(2);
        let cache = BlockCache::new(4);
        let mut decoder = Decoder::new(CountingEngine::new(), cache, map, 0, 0x8000, 2);
        let out = decoder.block(&mut content, 0).unwrap();
        assert_eq!(out, vec![0u8; 16]);
        assert_eq!(decoder.engine.resets, 1);
    }

    #[test]
    fn sequential_forward_access_resumes_without_extra_reset() {
        let (_bm_src, map) = blockmap(4, 16);
        let mut content = content_source(4);
        let cache = BlockCache::new(1); // force cache misses so replay logic is exercised
        let mut decoder = Decoder::new(CountingEngine::new(), cache, map, 0, 0x8000, 4);
        decoder.block(&mut content, 0).unwrap();
        decoder.block(&mut content, 1).unwrap();
        decoder.block(&mut content, 2).unwrap();
        // All three blocks are within one reset interval (reset_blkcount=4)
        // and requested in increasing order, so only the first call resets.
        assert_eq!(decoder.engine.resets, 1);
    }

    #[test]
    fn out_of_order_access_replays_from_reset_point() {
        let (_bm_src, map) = blockmap(4, 16);
        let mut content = content_source(4);
        let cache = BlockCache::new(1);
        let mut decoder = Decoder::new(CountingEngine::new(), cache, map, 0, 0x8000, 4);
        decoder.block(&mut content, 2).unwrap();
        // Requesting block 1 after block 2 can't resume forward; must replay
        // from the reset point (block 0) through block 1.
        decoder.block(&mut content, 1).unwrap();
        assert_eq!(decoder.engine.resets, 2);
    }

    #[test]
    fn replayed_intermediate_blocks_are_also_cached() {
        let (_bm_src, map) = blockmap(4, 16);
        let mut content = content_source(4);
        let cache = BlockCache::new(4); // large enough that no replay collides out
        let mut decoder = Decoder::new(CountingEngine::new(), cache, map, 0, 0x8000, 4);
        // Decoding block 2 from a fresh reset replays blocks 0 and 1 too.
        decoder.block(&mut content, 2).unwrap();
        let resets_before = decoder.engine.resets;
        // Block 0 was replayed as a side effect and must already be cached,
        // so this does not trigger another reset.
        decoder.block(&mut content, 0).unwrap();
        assert_eq!(decoder.engine.resets, resets_before);
    }

    #[test]
    fn cached_block_short_circuits_decoding() {
        let (_bm_src, map) = blockmap(2, 16);
        let mut content = content_source(2);
        let cache = BlockCache::new(4);
        let mut decoder = Decoder::new(CountingEngine::new(), cache, map, 0, 0x8000, 2);
        decoder.block(&mut content, 0).unwrap();
        let resets_before = decoder.engine.resets;
        decoder.block(&mut content, 0).unwrap();
        assert_eq!(decoder.engine.resets, resets_before);
    }
}
