//! ITSP header (directory framing), spec §3 and §6.1.

use crate::error::{ChmError, Result};
use crate::unmarshal::Cursor;

pub const ITSP_LEN: usize = 0x54;

#[derive(Debug, Clone)]
pub struct ItspHeader {
    pub header_len: i32,
    pub block_len: u32,
    pub blockidx_intvl: i32,
    pub index_depth: i32,
    pub index_root: i32,
    pub index_head: i32,
    pub num_blocks: u32,
    pub lang_id: u32,
    pub system_uuid: [u8; 16],
}

impl ItspHeader {
    /// Parses the fixed 0x54-byte ITSP header found immediately after ITSF
    /// at `dir_offset`. If `index_root <= -1` the directory has no PMGI
    /// layer; callers should then use `index_head` as the PMGL chain start.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(buf);
        let signature = c.bytes(4);
        if signature != b"ITSP" {
            return Err(ChmError::MalformedHeader("missing ITSP signature"));
        }
        let version = c.i32();
        let header_len = c.i32();
        let _reserved = c.i32();
        let block_len = c.u32();
        let blockidx_intvl = c.i32();
        let index_depth = c.i32();
        let mut index_root = c.i32();
        let index_head = c.i32();
        let _reserved = c.i32();
        let num_blocks = c.u32();
        let _reserved = c.i32();
        let lang_id = c.u32();
        let system_uuid = c.uuid();

        if !c.ok() {
            return Err(ChmError::OutOfBounds);
        }
        if version != 1 {
            return Err(ChmError::MalformedHeader("unsupported ITSP version"));
        }
        if header_len as usize != ITSP_LEN {
            return Err(ChmError::MalformedHeader("invalid ITSP header length"));
        }
        if block_len == 0 {
            return Err(ChmError::MalformedHeader("ITSP block_len must be nonzero"));
        }
        if index_root <= -1 {
            index_root = index_head;
        }

        Ok(ItspHeader {
            header_len,
            block_len,
            blockidx_intvl,
            index_depth,
            index_root,
            index_head,
            num_blocks,
            lang_id,
            system_uuid,
        })
    }
}
