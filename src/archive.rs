//! Archive handle lifecycle and the retrieve façade (spec §4.6, §4.7).

use crate::blockmap::BlockMap;
use crate::cache::{BlockCache, DEFAULT_CAPACITY};
use crate::decoder::Decoder;
use crate::directory::{Directory, CONTENT_PATH, CONTROL_DATA_PATH, RESET_TABLE_PATH};
use crate::entry::{Entry, Namespace};
use crate::error::{ChmError, Result};
use crate::header::control_data::ControlData;
use crate::header::reset_table::{RESET_TABLE_LEN, ResetTable};
use crate::header::ContainerLayout;
use crate::lzx::{LzxEngine, LzxdEngine};
use crate::source::ByteSource;

/// Tunable knobs for [`Archive::open_with_options`].
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    pub cache_capacity: usize,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// An opened CHM/ITSS archive: the parsed directory plus, if the archive
/// carries compressed content, the decoder needed to retrieve it.
pub struct Archive<S: ByteSource, E: LzxEngine = LzxdEngine> {
    source: S,
    layout: ContainerLayout,
    directory: Directory,
    data_offset: u64,
    decoder: Option<Decoder<E>>,
}

impl<S: ByteSource> Archive<S, LzxdEngine> {
    pub fn open(source: S) -> Result<Self> {
        Self::open_with_options(source, OpenOptions::default())
    }

    pub fn open_with_options(source: S, options: OpenOptions) -> Result<Self> {
        Self::open_with_engine(source, options, LzxdEngine::new())
    }
}

impl<S: ByteSource, E: LzxEngine> Archive<S, E> {
    /// Opens an archive using a caller-supplied LZX engine. The production
    /// entry points above always pass [`LzxdEngine`]; this is exposed so
    /// alternate engines (or test doubles) can drive the exact same open
    /// sequence.
    pub fn open_with_engine(mut source: S, options: OpenOptions, engine: E) -> Result<Self> {
        let layout = ContainerLayout::parse(&mut source)?;
        let directory = Directory::read(&mut source, &layout)?;
        let data_offset = layout.itsf.data_offset;

        let decoder = Self::build_decoder(&mut source, &directory, data_offset, options, engine)?;

        log::debug!("archive opened: {} entries, compression={}", directory.entries().len(), decoder.is_some());

        Ok(Archive {
            source,
            layout,
            directory,
            data_offset,
            decoder,
        })
    }

    fn build_decoder(
        source: &mut S,
        directory: &Directory,
        data_offset: u64,
        options: OpenOptions,
        engine: E,
    ) -> Result<Option<Decoder<E>>> {
        let reset_entry = match directory.find_well_known(RESET_TABLE_PATH) {
            Some(e) => e,
            None => return Ok(None),
        };
        let control_entry = match directory.find_well_known(CONTROL_DATA_PATH) {
            Some(e) => e,
            None => return Ok(None),
        };
        let content_entry = match directory.find_well_known(CONTENT_PATH) {
            Some(e) => e,
            None => return Ok(None),
        };

        let reset_table_offset = data_offset + reset_entry.start;
        let mut reset_buf = vec![0u8; RESET_TABLE_LEN];
        let n = source.read_at(&mut reset_buf, reset_table_offset)?;
        if n < RESET_TABLE_LEN {
            return Err(ChmError::ShortRead {
                offset: reset_table_offset,
                expected: RESET_TABLE_LEN,
                actual: n,
            });
        }
        let reset_table = ResetTable::parse(&reset_buf)?;

        let control_offset = data_offset + control_entry.start;
        let mut control_buf = vec![0u8; control_entry.length.min(64) as usize];
        let n = source.read_at(&mut control_buf, control_offset)?;
        if (n as u64) < control_entry.length.min(64) {
            return Err(ChmError::ShortRead {
                offset: control_offset,
                expected: control_buf.len(),
                actual: n,
            });
        }
        let control_data = ControlData::parse(&control_buf)?;

        let block_map = BlockMap::read(source, &reset_table, reset_table_offset)?;
        let content_start = data_offset + content_entry.start;

        let cache = BlockCache::new(options.cache_capacity);
        Ok(Some(Decoder::new(
            engine,
            cache,
            block_map,
            content_start,
            control_data.window_size,
            control_data.reset_blkcount,
        )))
    }

    /// Changes the decompressed-block cache capacity; a no-op for
    /// uncompressed archives.
    pub fn set_cache_size(&mut self, capacity: usize) {
        if let Some(decoder) = &mut self.decoder {
            decoder.set_cache_capacity(capacity);
        }
    }

    pub fn entries(&self) -> &[Entry] {
        self.directory.entries()
    }

    pub fn find(&self, path: &str) -> Option<&Entry> {
        self.directory.find(path)
    }

    /// Reads `buf.len()` bytes of `entry`'s content starting at `offset`
    /// within that entry, returning the number of bytes actually copied
    /// (fewer than `buf.len()` only if the read runs past the entry's end).
    pub fn retrieve(&mut self, entry: &Entry, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let readable = entry.length.saturating_sub(offset).min(buf.len() as u64) as usize;
        if readable == 0 {
            return Ok(0);
        }
        let buf = &mut buf[..readable];

        match entry.namespace {
            Namespace::Uncompressed => {
                let abs = self.data_offset + entry.start + offset;
                let n = self.source.read_at(buf, abs)?;
                Ok(n)
            }
            Namespace::Compressed => {
                // Compression metadata missing or misplaced disables
                // compression for the whole archive; a compressed entry then
                // simply has nothing retrievable.
                let decoder = match self.decoder.as_mut() {
                    Some(decoder) => decoder,
                    None => return Ok(0),
                };
                let block_len = self.layout.itsp.block_len as u64;
                let mut produced = 0usize;
                let mut abs_pos = entry.start + offset;
                while produced < buf.len() {
                    let block = abs_pos / block_len;
                    let block_off = (abs_pos % block_len) as usize;
                    let decoded = decoder.block(&mut self.source, block)?;
                    let avail = decoded.len().saturating_sub(block_off);
                    if avail == 0 {
                        break;
                    }
                    let take = avail.min(buf.len() - produced);
                    buf[produced..produced + take].copy_from_slice(&decoded[block_off..block_off + take]);
                    produced += take;
                    abs_pos += take as u64;
                }
                Ok(produced)
            }
            Namespace::Reserved(_) => Ok(0),
        }
    }
}
