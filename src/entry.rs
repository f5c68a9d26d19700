//! Directory entries and their path-derived classification (spec §3).

use bitflags::bitflags;

bitflags! {
    /// Classification of a path into `{DIRS|FILES} x {NORMAL|SPECIAL|META}`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntryFlags: u8 {
        const DIRS = 0b0000_0001;
        const FILES = 0b0000_0010;
        const NORMAL = 0b0000_0100;
        const SPECIAL = 0b0000_1000;
        const META = 0b0001_0000;
    }
}

/// Which section of the archive an entry's bytes live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Uncompressed,
    Compressed,
    /// Any namespace byte other than 0 or 1. Reserved; retrieve always
    /// returns zero bytes for these.
    Reserved(u64),
}

impl Namespace {
    pub fn from_raw(space: u64) -> Self {
        match space {
            0 => Namespace::Uncompressed,
            1 => Namespace::Compressed,
            other => Namespace::Reserved(other),
        }
    }
}

/// Classifies a non-empty entry path per spec §3:
/// a path ending in `/` is a directory, otherwise a file; paths starting with
/// `/` are normal entries (or "special" if the second byte is `#` or `$`);
/// paths not starting with `/` are meta-entries.
pub fn classify_path(path: &str) -> EntryFlags {
    debug_assert!(!path.is_empty());
    let bytes = path.as_bytes();
    let mut flags = if bytes[bytes.len() - 1] == b'/' {
        EntryFlags::DIRS
    } else {
        EntryFlags::FILES
    };
    flags = if bytes[0] == b'/' {
        if bytes.len() > 1 && (bytes[1] == b'#' || bytes[1] == b'$') {
            flags | EntryFlags::SPECIAL
        } else {
            flags | EntryFlags::NORMAL
        }
    } else {
        flags | EntryFlags::META
    };
    flags
}

/// A single directory entry: a named object with a namespace, a start offset
/// within that namespace, and a byte length.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: String,
    pub namespace: Namespace,
    pub start: u64,
    pub length: u64,
    pub flags: EntryFlags,
}

impl Entry {
    pub fn new(path: String, namespace_raw: u64, start: u64, length: u64) -> Self {
        let flags = classify_path(&path);
        Entry {
            path,
            namespace: Namespace::from_raw(namespace_raw),
            start,
            length,
            flags,
        }
    }
}
