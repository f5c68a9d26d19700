//! PMGL leaf pages: header plus the back-to-back entry records they hold
//! (spec §4.3, §6.1).

use crate::entry::Entry;
use crate::error::{ChmError, Result};
use crate::unmarshal::Cursor;

pub const PMGL_HEADER_LEN: usize = 0x14;
pub const MAX_PATH_LEN: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct PmglPageHeader {
    pub free_space: u32,
    pub block_prev: i32,
    pub block_next: i32,
}

impl PmglPageHeader {
    pub fn parse(page: &[u8], block_len: u32) -> Result<Self> {
        if (block_len as usize) < PMGL_HEADER_LEN {
            return Err(ChmError::MalformedHeader("ITSP block_len smaller than PMGL header"));
        }
        let mut c = Cursor::new(page);
        let signature = c.bytes(4);
        if signature != b"PMGL" {
            return Err(ChmError::MalformedHeader("missing PMGL signature"));
        }
        let free_space = c.u32();
        let _unknown = c.u32();
        let block_prev = c.i32();
        let block_next = c.i32();
        if !c.ok() {
            return Err(ChmError::OutOfBounds);
        }
        if free_space > block_len - PMGL_HEADER_LEN as u32 {
            return Err(ChmError::MalformedHeader("PMGL free_space exceeds block_len"));
        }
        Ok(PmglPageHeader {
            free_space,
            block_prev,
            block_next,
        })
    }
}

/// Parses every entry record in a single PMGL page, from right after the
/// 0x14-byte header up to `block_len - free_space`.
pub fn parse_page_entries(page: &[u8], header: &PmglPageHeader) -> Result<Vec<Entry>> {
    let end = page
        .len()
        .checked_sub(header.free_space as usize)
        .ok_or(ChmError::OutOfBounds)?;
    let mut c = Cursor::new(&page[..end]);
    c.bytes(PMGL_HEADER_LEN);

    let mut entries = Vec::new();
    while c.position() < end {
        let path_len = c.cword() as usize;
        if path_len > MAX_PATH_LEN {
            return Err(ChmError::PathTooLong { max: MAX_PATH_LEN });
        }
        let path_bytes = c.bytes(path_len);
        if !c.ok() {
            return Err(ChmError::OutOfBounds);
        }
        let path = std::str::from_utf8(path_bytes)
            .map_err(|_| ChmError::InvalidPath)?
            .to_string();
        let namespace = c.cword();
        let start = c.cword();
        let length = c.cword();
        if !c.ok() {
            return Err(ChmError::OutOfBounds);
        }
        entries.push(Entry::new(path, namespace, start, length));
    }
    Ok(entries)
}
