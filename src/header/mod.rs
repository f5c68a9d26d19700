//! Header parsers for the two framing headers and directory structures
//! (spec §4.3, §6.1).

pub mod control_data;
pub mod itsf;
pub mod itsp;
pub mod pmgl;
pub mod reset_table;

pub use control_data::ControlData;
pub use itsf::ItsfHeader;
pub use itsp::ItspHeader;
pub use reset_table::ResetTable;

use crate::error::{ChmError, Result};
use crate::source::ByteSource;

/// The combined outer (ITSF) and directory (ITSP) framing, parsed in order
/// per spec §4.3 steps 1-3.
#[derive(Debug, Clone)]
pub struct ContainerLayout {
    pub itsf: ItsfHeader,
    pub itsp: ItspHeader,
}

impl ContainerLayout {
    pub fn parse(source: &mut dyn ByteSource) -> Result<Self> {
        let mut buf = vec![0u8; itsf::ITSF_V3_LEN];
        let n = source.read_at(&mut buf, 0)?;
        if n < itsf::ITSF_V2_LEN {
            return Err(ChmError::ShortRead {
                offset: 0,
                expected: itsf::ITSF_V2_LEN,
                actual: n,
            });
        }
        let itsf = ItsfHeader::parse(&buf[..n])?;
        log::debug!("ITSF v{} header parsed, dir_offset={:#x}", itsf.version, itsf.dir_offset);

        let mut itsp_buf = vec![0u8; itsp::ITSP_LEN];
        let n = source.read_at(&mut itsp_buf, itsf.dir_offset)?;
        if n < itsp::ITSP_LEN {
            return Err(ChmError::ShortRead {
                offset: itsf.dir_offset,
                expected: itsp::ITSP_LEN,
                actual: n,
            });
        }
        let itsp = ItspHeader::parse(&itsp_buf)?;
        log::debug!(
            "ITSP header parsed, index_head={} block_len={:#x} num_blocks={}",
            itsp.index_head,
            itsp.block_len,
            itsp.num_blocks
        );

        Ok(ContainerLayout { itsf, itsp })
    }

    /// Byte offset where the directory's page data begins (after the ITSP
    /// header that immediately follows ITSF's `dir_offset`).
    pub fn blocks_offset(&self) -> u64 {
        self.itsf.dir_offset + self.itsp.header_len as u64
    }

    /// Number of PMGL/PMGI blocks, falling back to deriving it from the
    /// directory length when the ITSP header carries the `0xFFFFFFFF`
    /// sentinel instead of an explicit count (see SPEC_FULL.md, supplemented
    /// feature 1).
    pub fn num_blocks(&self) -> Result<u64> {
        if self.itsp.num_blocks != u32::MAX {
            return Ok(self.itsp.num_blocks as u64);
        }
        let dir_blocks_len = self
            .itsf
            .dir_len
            .checked_sub(self.itsp.header_len as u64)
            .ok_or(ChmError::MalformedHeader("dir_len smaller than ITSP header_len"))?;
        Ok(dir_blocks_len / self.itsp.block_len as u64)
    }
}
