//! LZXC control data and the derived `reset_blkcount` (spec §3, §6.1).

use crate::error::{ChmError, Result};
use crate::unmarshal::Cursor;

pub const CONTROL_DATA_MIN_LEN: usize = 0x18;
pub const CONTROL_DATA_V2_LEN: usize = 0x1c;

#[derive(Debug, Clone)]
pub struct ControlData {
    pub window_size: u32,
    pub reset_interval: u32,
    pub windows_per_reset: u32,
    /// Number of compressed blocks between LZX state resets, derived as
    /// `reset_interval / (window_size / 2) * windows_per_reset`.
    pub reset_blkcount: u32,
}

impl ControlData {
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < CONTROL_DATA_MIN_LEN {
            return Err(ChmError::MalformedHeader("LZXC control data too short"));
        }
        let mut c = Cursor::new(buf);
        let _size = c.u32();
        let signature = c.bytes(4);
        if signature != b"LZXC" {
            return Err(ChmError::MalformedHeader("missing LZXC signature"));
        }
        let version = c.u32();
        let mut reset_interval = c.u32();
        let mut window_size = c.u32();
        let windows_per_reset = c.u32();
        if !c.ok() {
            return Err(ChmError::OutOfBounds);
        }

        if version == 2 {
            reset_interval = reset_interval.saturating_mul(0x8000);
            window_size = window_size.saturating_mul(0x8000);
        }
        if window_size < 2 {
            return Err(ChmError::MalformedHeader("LZXC window size must be >= 2"));
        }
        let half_window = window_size / 2;
        if reset_interval == 0 || reset_interval % half_window != 0 {
            return Err(ChmError::MalformedHeader(
                "reset interval must be a nonzero multiple of window_size / 2",
            ));
        }
        let reset_blkcount = (reset_interval / half_window).saturating_mul(windows_per_reset);
        if reset_blkcount == 0 {
            return Err(ChmError::MalformedHeader("derived reset_blkcount is zero"));
        }

        Ok(ControlData {
            window_size,
            reset_interval,
            windows_per_reset,
            reset_blkcount,
        })
    }
}
