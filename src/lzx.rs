//! The opaque LZX decompression collaborator (spec §4.5, §9).
//!
//! This crate never implements LZX itself; it depends on the independently
//! maintained `lzxd` crate for the bit-level decoding and exposes only the
//! narrow sequential interface the decoder driver needs, behind the
//! [`LzxEngine`] trait. The trait boundary also lets the driver's
//! reset/replay bookkeeping be tested without needing hand-built LZXD
//! bitstreams.

use crate::error::{ChmError, Result};

/// A sequential LZX decompression engine: every chunk must be fed in order
/// since the last [`LzxEngine::reset`], mirroring LZXD's own requirement that
/// a block can only be decoded by replaying everything since the last reset
/// point.
pub trait LzxEngine {
    /// (Re)initializes decompression state for a window of `window_size`
    /// bytes, discarding any previously accumulated history.
    fn reset(&mut self, window_size: u32) -> Result<()>;

    /// Decompresses the next sequential chunk, returning exactly
    /// `expected_len` bytes of output.
    fn decompress_chunk(&mut self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>>;
}

fn window_size_for(bytes: u32) -> Result<lzxd::WindowSize> {
    use lzxd::WindowSize::*;
    Ok(match bytes {
        0x8000 => KB32,
        0x10000 => KB64,
        0x20000 => KB128,
        0x40000 => KB256,
        0x80000 => KB512,
        0x100000 => MB1,
        0x200000 => MB2,
        0x400000 => MB4,
        0x800000 => MB8,
        0x1000000 => MB16,
        0x2000000 => MB32,
        _ => return Err(ChmError::MalformedHeader("unsupported LZX window size")),
    })
}

/// Production [`LzxEngine`] backed by the real `lzxd` decoder.
pub struct LzxdEngine {
    inner: Option<lzxd::Lzxd>,
}

impl LzxdEngine {
    pub fn new() -> Self {
        LzxdEngine { inner: None }
    }
}

impl Default for LzxdEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LzxEngine for LzxdEngine {
    fn reset(&mut self, window_size: u32) -> Result<()> {
        let ws = window_size_for(window_size)?;
        self.inner = Some(lzxd::Lzxd::new(ws));
        Ok(())
    }

    fn decompress_chunk(&mut self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let engine = self
            .inner
            .as_mut()
            .ok_or(ChmError::DecodeFailed("LZX engine decoded before reset".into()))?;
        let out = engine
            .decompress_next(compressed)
            .map_err(|e| ChmError::DecodeFailed(e.to_string()))?;
        if out.len() < expected_len {
            return Err(ChmError::DecodeFailed(format!(
                "LZX chunk produced {} bytes, expected at least {}",
                out.len(),
                expected_len
            )));
        }
        Ok(out[..expected_len].to_vec())
    }
}
