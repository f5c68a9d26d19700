//! Reader for the ITSS/CHM container format: header framing, paged
//! directory, and LZX-backed compressed content retrieval.
//!
//! Typical use:
//!
//! ```no_run
//! use chm_archive::{Archive, FileSource};
//!
//! # fn main() -> chm_archive::Result<()> {
//! let source = FileSource::open("example.chm")?;
//! let mut archive = Archive::open(source)?;
//! if let Some(entry) = archive.find("/index.html").cloned() {
//!     let mut buf = vec![0u8; entry.length as usize];
//!     archive.retrieve(&entry, 0, &mut buf)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod blockmap;
pub mod cache;
pub mod debug;
pub mod decoder;
pub mod directory;
pub mod entry;
pub mod error;
pub mod header;
pub mod lzx;
pub mod source;
pub mod unmarshal;

pub use archive::{Archive, OpenOptions};
pub use debug::set_debug_print;
pub use entry::{Entry, EntryFlags, Namespace};
pub use error::{ChmError, Result};
pub use source::{ByteSource, FileSource, MemorySource};
