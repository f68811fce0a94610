//! Fixed-size header stored at offset 0 of the log file.
//!
//! Layout (big-endian, 30 bytes):
//!
//! | Offset | Field                          | Size |
//! |--------|--------------------------------|------|
//! | 0      | format version                 | 4    |
//! | 4      | last cached commit date (ms)   | 8    |
//! | 12     | first cached commit date (ms)  | 8    |
//! | 20     | earliest change list number    | 8    |
//! | 28     | complete history flag          | 2    |

use std::io::{self, Read, Write};

/// Format version written by this build. Any other value marks the cache stale.
pub const FORMAT_VERSION: i32 = 3;

pub const HEADER_SIZE: u64 = 30;

/// 2020-02-02T00:00:00Z, the first cached date before anything is written.
const DEFAULT_FIRST_CACHED_MILLIS: i64 = 1_580_601_600_000;

/// 1970-02-02T00:00:00Z, the last cached date before anything is written.
const DEFAULT_LAST_CACHED_MILLIS: i64 = 2_764_800_000;

/// Outcome of reading the header from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLoad {
    /// The header matches [`FORMAT_VERSION`] (or could not be read and defaults stay in place).
    Ready,
    /// The header was written by a different format version.
    Stale { found: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub last_cached_millis: i64,
    pub first_cached_millis: i64,
    pub first_cached_change_list: i64,
    pub complete_history: bool,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            last_cached_millis: DEFAULT_LAST_CACHED_MILLIS,
            first_cached_millis: DEFAULT_FIRST_CACHED_MILLIS,
            first_cached_change_list: i64::MAX,
            complete_history: false,
        }
    }
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[0..4].copy_from_slice(&FORMAT_VERSION.to_be_bytes());
        buf[4..12].copy_from_slice(&self.last_cached_millis.to_be_bytes());
        buf[12..20].copy_from_slice(&self.first_cached_millis.to_be_bytes());
        buf[20..28].copy_from_slice(&self.first_cached_change_list.to_be_bytes());
        buf[28..30].copy_from_slice(&i16::from(self.complete_history).to_be_bytes());
        buf
    }

    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&self.to_bytes())
    }

    /// Reads a header, returning the version found alongside it.
    ///
    /// The caller decides what a version mismatch means; the remaining fields are
    /// decoded regardless.
    pub fn read_from<R: Read>(source: &mut R) -> io::Result<(i32, Header)> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        source.read_exact(&mut buf)?;
        Ok(Self::decode(&buf))
    }

    fn decode(buf: &[u8; HEADER_SIZE as usize]) -> (i32, Header) {
        let version = i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let header = Header {
            last_cached_millis: read_i64(&buf[4..12]),
            first_cached_millis: read_i64(&buf[12..20]),
            first_cached_change_list: read_i64(&buf[20..28]),
            complete_history: i16::from_be_bytes([buf[28], buf[29]]) != 0,
        };
        (version, header)
    }
}

pub(crate) fn read_i64(bytes: &[u8]) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    i64::from_be_bytes(raw)
}
