//! Paged on-disk overflow store
//!
//! When the working queue saturates or the sink is down, items are appended
//! to page files and replayed later. A page is a flat file of delimited
//! records: each record is the codec's serialized form followed by a single
//! carriage-return byte. Pages carry no header, checksum, or record count -
//! readers rely on delimiter scanning.
//!
//! Pages are written append-only and read start-to-end; a page is deleted
//! only after being fully consumed. Page files are named `_` followed by the
//! 20-digit zero-padded sequence number, so lexicographic directory order is
//! sequence order.
//!
//! Two sequence bands keep normal and shutdown traffic apart: the write path
//! starts at sequence 100, the shutdown recovery flush at sequence 1.

use std::io::{self, BufRead, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use std::fs;

use parking_lot::Mutex;

use crate::handler::ItemCodec;

/// First sequence of the normal write band
pub const FIRST_PAGE_SEQUENCE: u64 = 100;

/// First sequence of the shutdown recovery band
pub const FIRST_RECOVERY_PAGE_SEQUENCE: u64 = 1;

/// Record delimiter byte (carriage return)
pub const PAGE_DELIMITER: u8 = 0x0D;

/// How often the directory size is recomputed
const SIZE_SAMPLE_INTERVAL: Duration = Duration::from_secs(10);

/// Result of one page read call
#[derive(Debug)]
pub struct PageRead<T> {
    /// Successfully deserialized items, in page order
    pub items: Vec<T>,

    /// Bytes consumed from the stream, including skipped records
    pub bytes_read: u64,
}

/// Paged file store for one buffer
///
/// Generic over the item codec so the store never interprets record bytes
/// itself. All methods take streams or sequences from the caller; the store
/// owns only the directory layout and the record format.
#[derive(Debug)]
pub struct FileBuffer<T, C> {
    /// Owning buffer id (used in logs)
    id: String,

    /// Page directory: `<base>/<normalized id>`
    dir: PathBuf,

    /// Record codec
    codec: Arc<C>,

    /// Page size limit in bytes
    page_limit: u64,

    /// Cached directory size (bytes), refreshed on a fixed interval
    directory_size: AtomicU64,

    /// When the directory size was last recomputed
    last_size_sample: Mutex<Option<Instant>>,

    _item: PhantomData<fn() -> T>,
}

impl<T, C: ItemCodec<T>> FileBuffer<T, C> {
    /// Create a file buffer rooted at `base_path`
    ///
    /// The page directory is derived from the buffer id (lower-cased,
    /// word-separated); it is created lazily on first write.
    pub fn new(base_path: &Path, id: impl Into<String>, codec: Arc<C>, page_limit: u64) -> Self {
        let id = id.into();
        let dir = base_path.join(normalize_id(&id));

        let buffer = Self {
            id,
            dir,
            codec,
            page_limit,
            directory_size: AtomicU64::new(0),
            last_size_sample: Mutex::new(None),
            _item: PhantomData,
        };
        buffer
            .directory_size
            .store(buffer.compute_directory_size(), Ordering::Relaxed);
        buffer
    }

    /// Owning buffer id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Page directory path
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Page size limit in bytes
    pub fn page_limit(&self) -> u64 {
        self.page_limit
    }

    /// Create the page directory if missing
    pub fn ensure_directory(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Path of the page file for `sequence`
    pub fn page_path(&self, sequence: u64) -> PathBuf {
        self.dir.join(page_filename(sequence))
    }

    /// Smallest page sequence present, or `minimum` if no pages exist
    pub fn first_page_sequence(&self, minimum: u64) -> u64 {
        self.page_sequences().into_iter().min().unwrap_or(minimum)
    }

    /// Largest page sequence present, or `minimum` if no pages exist
    pub fn last_page_sequence(&self, minimum: u64) -> u64 {
        self.page_sequences().into_iter().max().unwrap_or(minimum)
    }

    /// Delete the page file for `sequence`
    pub fn delete_page(&self, sequence: u64) -> io::Result<()> {
        fs::remove_file(self.page_path(sequence))
    }

    /// Read up to `max_items` records from an open page stream
    ///
    /// Scans for the delimiter, deserializing each record. A record the
    /// codec rejects is skipped and the scan cursor still advances past its
    /// delimiter; `bytes_read` includes skipped records. Stops at
    /// `max_items`, or at the end of the stream.
    pub fn read<R: BufRead>(&self, reader: &mut R, max_items: usize) -> io::Result<PageRead<T>> {
        let mut items = Vec::new();
        let mut bytes_read = 0u64;
        let mut record = Vec::new();

        while items.len() < max_items {
            record.clear();
            let n = reader.read_until(PAGE_DELIMITER, &mut record)?;
            if n == 0 {
                break;
            }
            bytes_read += n as u64;

            let line = match record.last() {
                Some(&PAGE_DELIMITER) => &record[..record.len() - 1],
                _ => &record[..],
            };
            if line.is_empty() {
                continue;
            }

            match self.codec.deserialize(line) {
                Some(item) => items.push(item),
                None => {
                    tracing::trace!(
                        buffer = %self.id,
                        bytes = line.len(),
                        "skipping undecodable record"
                    );
                }
            }
        }

        Ok(PageRead { items, bytes_read })
    }

    /// Serialize items to an open page stream, delimiting each record
    ///
    /// Accumulates the serialized size into `page_size` and stops early once
    /// it exceeds `page_limit`, returning the partial count so the caller
    /// rotates to a new page. The item that pushes the size over the limit
    /// is the last one written to this page.
    pub fn write<W: Write>(
        &self,
        writer: &mut W,
        page_size: &mut u64,
        page_limit: u64,
        items: &[T],
    ) -> io::Result<usize> {
        let mut written = 0;

        for item in items {
            let n = self.codec.serialize(item, &mut *writer)?;
            writer.write_all(&[PAGE_DELIMITER])?;
            written += 1;

            *page_size += n as u64 + 1;
            if *page_size > page_limit {
                break;
            }
        }

        Ok(written)
    }

    /// Directory size in bytes, recomputed at most once per sample interval
    ///
    /// Filesystem traversal is kept off the hot path: between samples the
    /// cached value is returned.
    pub fn sampled_directory_size(&self) -> u64 {
        let mut last = self.last_size_sample.lock();
        let due = last.map_or(true, |at| at.elapsed() >= SIZE_SAMPLE_INTERVAL);
        if due {
            let size = self.compute_directory_size();
            self.directory_size.store(size, Ordering::Relaxed);
            *last = Some(Instant::now());
        }
        self.directory_size.load(Ordering::Relaxed)
    }

    /// Sum of file sizes in the page directory (0 if it does not exist)
    fn compute_directory_size(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .flatten()
            .filter_map(|entry| entry.metadata().ok())
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
            .sum()
    }

    /// All page sequences present in the directory
    fn page_sequences(&self) -> Vec<u64> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                parse_page_sequence(name.to_str()?)
            })
            .collect()
    }
}

/// Render the page filename for `sequence`
pub fn page_filename(sequence: u64) -> String {
    format!("_{sequence:020}")
}

/// Parse a page filename back into its sequence number
fn parse_page_sequence(name: &str) -> Option<u64> {
    name.strip_prefix('_')?.parse().ok()
}

/// Normalize a buffer id into a directory name
///
/// Lower-cases, splits words on separators (space, `-`, `.`, `:`) and on
/// case boundaries, and joins with underscores.
fn normalize_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    let mut prev_lower = false;

    for c in id.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() {
                if prev_lower {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
                prev_lower = false;
            } else {
                out.push(c);
                prev_lower = true;
            }
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }

    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
#[path = "file_buffer_test.rs"]
mod file_buffer_test;
