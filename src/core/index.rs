//! Fixed-size index entries, one per cached change list.
//!
//! Each entry is 26 big-endian bytes: change list number (8), commit date in
//! milliseconds (8), byte offset of the record in the log (8) and the
//! completely-downloaded flag (2). Entries are appended in the same order as the
//! log records they point at, so the tail of the index file is always the most
//! recent history.

use crate::core::header::read_i64;
use std::io::{self, Read, Write};

pub const INDEX_ENTRY_SIZE: u64 = 3 * 8 + 2;

/// File name suffix appended to the log path to form the index path.
pub const INDEX_EXTENSION: &str = ".index";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub number: i64,
    pub date_millis: i64,
    pub offset: u64,
    pub completely_downloaded: bool,
}

impl IndexEntry {
    pub fn to_bytes(&self) -> [u8; INDEX_ENTRY_SIZE as usize] {
        let mut buf = [0u8; INDEX_ENTRY_SIZE as usize];
        buf[0..8].copy_from_slice(&self.number.to_be_bytes());
        buf[8..16].copy_from_slice(&self.date_millis.to_be_bytes());
        buf[16..24].copy_from_slice(&(self.offset as i64).to_be_bytes());
        buf[24..26].copy_from_slice(&i16::from(self.completely_downloaded).to_be_bytes());
        buf
    }

    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&self.to_bytes())
    }

    pub fn read_from<R: Read>(source: &mut R) -> io::Result<IndexEntry> {
        let mut buf = [0u8; INDEX_ENTRY_SIZE as usize];
        source.read_exact(&mut buf)?;
        Ok(IndexEntry {
            number: read_i64(&buf[0..8]),
            date_millis: read_i64(&buf[8..16]),
            offset: read_i64(&buf[16..24]) as u64,
            completely_downloaded: i16::from_be_bytes([buf[24], buf[25]]) != 0,
        })
    }

    /// Same entry with the completeness flag replaced.
    pub fn with_completely_downloaded(self, completely_downloaded: bool) -> Self {
        Self {
            completely_downloaded,
            ..self
        }
    }
}

/// An index entry together with the byte position it was read from in the index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedIndexEntry {
    pub index_offset: u64,
    pub entry: IndexEntry,
}
