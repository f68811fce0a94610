//! On-disk cache of committed change lists.
//!
//! A cache is a pair of files: the log, holding a 30-byte [`Header`] followed by
//! codec-serialized change-list records, and the index (log path + `.index`), an
//! array of fixed-size [`IndexEntry`] records in the same chronological order as
//! the log. The index lets recent history be read from the tail without scanning
//! the log.
//!
//! # Public API
//! - [`ChangesCacheFile`]: owns both files and every operation on them
//!
//! # Protocol
//! Every operation opens the pair through [`ChangesCacheFile::open_streams`], does its
//! work and drops the returned [`CacheStreams`], which closes both files on every exit
//! path. After any mutation the header is the last thing written. Records are written
//! before the index entries that reference them, and index entries before the header
//! that summarises them.
//!
//! The header load reads the log alone and entry counts come from file metadata, so
//! neither creates files for a cache that does not exist yet.
//!
//! There is no locking: a single writer per cache is assumed.

use crate::core::change_list::{
    ChangeListCodec, CommittedChangeList, ExactRevisionComparator, RepositoryLocation,
    RevisionComparator,
};
use crate::core::error::{CacheError, Result};
use crate::core::filter::ChangeListFilter;
use crate::core::header::{Header, HeaderLoad, FORMAT_VERSION, HEADER_SIZE};
use crate::core::index::{IndexEntry, LocatedIndexEntry, INDEX_ENTRY_SIZE, INDEX_EXTENSION};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// The open log/index file pair. Dropping it closes both files.
#[derive(Debug)]
pub struct CacheStreams {
    pub(crate) log: File,
    pub(crate) index: File,
}

pub struct ChangesCacheFile<C: ChangeListCodec> {
    path: PathBuf,
    index_path: PathBuf,
    codec: C,
    comparator: Box<dyn RevisionComparator>,
    root_path: PathBuf,
    location: RepositoryLocation,
    header: Header,
    header_loaded: bool,
}

impl<C: ChangeListCodec> ChangesCacheFile<C> {
    pub fn new(
        path: impl Into<PathBuf>,
        codec: C,
        root_path: impl Into<PathBuf>,
        location: RepositoryLocation,
    ) -> Self {
        let path = path.into();
        let mut index_path = path.clone().into_os_string();
        index_path.push(INDEX_EXTENSION);

        Self {
            path,
            index_path: PathBuf::from(index_path),
            codec,
            comparator: Box::new(ExactRevisionComparator),
            root_path: root_path.into(),
            location,
            header: Header::default(),
            header_loaded: false,
        }
    }

    /// Replace the revision comparator used when reconciling updated files.
    pub fn with_revision_comparator(mut self, comparator: impl RevisionComparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub(crate) fn comparator(&self) -> &dyn RevisionComparator {
        self.comparator.as_ref()
    }

    /// True when nothing is cached.
    ///
    /// A log written by another format version is deleted together with its index,
    /// after which the cache reports empty.
    pub fn is_empty(&mut self) -> bool {
        if !self.path.exists() {
            return true;
        }
        if let HeaderLoad::Stale { found } = self.load_header() {
            log::warn!(
                "Discarding cache '{}': format version {} (expected {})",
                self.path.display(),
                found,
                FORMAT_VERSION
            );
            self.delete_files();
            return true;
        }
        false
    }

    fn delete_files(&mut self) {
        for path in [&self.path, &self.index_path] {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::error!("Failed to delete cache file '{}': {}", path.display(), e);
                }
            }
        }
        self.header = Header::default();
        self.header_loaded = false;
    }

    /// Load the header once. I/O failures are logged and leave the in-memory values alone.
    pub fn load_header(&mut self) -> HeaderLoad {
        if self.header_loaded || !self.path.exists() {
            return HeaderLoad::Ready;
        }

        let read = File::open(&self.path).and_then(|mut file| Header::read_from(&mut file));
        match read {
            Ok((version, _)) if version != FORMAT_VERSION => {
                return HeaderLoad::Stale { found: version };
            }
            Ok((_, header)) => {
                log::debug!("Loaded cache header from {}", self.path.display());
                self.header = header;
            }
            Err(e) => {
                log::error!(
                    "Failed to read cache header '{}': {}",
                    self.path.display(),
                    e
                );
            }
        }
        self.header_loaded = true;
        HeaderLoad::Ready
    }

    /// Open both files for reading and writing, creating them if needed.
    ///
    /// If the index cannot be opened the log handle is dropped before the error is
    /// returned, so a half-open pair is never observable.
    pub fn open_streams(&self) -> Result<CacheStreams> {
        let log = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        let index = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.index_path)?;
        Ok(CacheStreams { log, index })
    }

    /// Rewrite the header at offset 0 of the log.
    pub fn write_header(&self, streams: &mut CacheStreams) -> Result<()> {
        streams.log.seek(SeekFrom::Start(0))?;
        self.header.write_to(&mut streams.log)?;
        Ok(())
    }

    /// Append change lists, skipping ones already present as the most recent entry.
    ///
    /// The batch is sorted by commit date before writing so the log and index stay in
    /// chronological order. Returns the change lists that were actually written.
    ///
    /// Only the single most recent index entry is consulted for duplicates. A change
    /// list matching an older entry is stored again.
    pub fn append_change_lists(
        &mut self,
        mut change_lists: Vec<C::ChangeList>,
        assume_completely_downloaded: bool,
    ) -> Result<Vec<C::ChangeList>> {
        let was_empty = self.is_empty();
        let mut streams = self.open_streams()?;

        if was_empty || streams.log.metadata()?.len() < HEADER_SIZE {
            self.write_header(&mut streams)?;
        }
        streams.log.seek(SeekFrom::End(0))?;
        let recent = read_last_index_entries(&mut streams.index, 0, 1)?;
        streams.index.seek(SeekFrom::End(0))?;

        change_lists.sort_by_key(|list| list.commit_date());

        let mut written = Vec::with_capacity(change_lists.len());
        for list in change_lists {
            let date_millis = list.commit_date().timestamp_millis();
            let duplicate = recent
                .iter()
                .any(|entry| entry.date_millis == date_millis && entry.number == list.number());
            if duplicate {
                log::debug!("Skipping already cached change list {}", list.number());
                continue;
            }

            let offset = streams.log.stream_position()?;
            self.codec.write_change_list(&mut streams.log, &list)?;

            let header = &mut self.header;
            header.last_cached_millis = header.last_cached_millis.max(date_millis);
            header.first_cached_millis = header.first_cached_millis.min(date_millis);
            header.first_cached_change_list = header.first_cached_change_list.min(list.number());

            IndexEntry {
                number: list.number(),
                date_millis,
                offset,
                completely_downloaded: assume_completely_downloaded,
            }
            .write_to(&mut streams.index)?;
            written.push(list);
        }

        self.write_header(&mut streams)?;
        self.header_loaded = true;
        log::debug!(
            "Cached {} new change lists in {}",
            written.len(),
            self.path.display()
        );
        Ok(written)
    }

    /// Read cached change lists accepted by `filter`, oldest first.
    ///
    /// `max_count == 0` scans the whole log. Otherwise at most `max_count` of the most
    /// recent matching change lists are returned, located through the index.
    pub fn read_change_lists<F>(&self, filter: &F, max_count: usize) -> Result<Vec<C::ChangeList>>
    where
        F: ChangeListFilter<C::ChangeList> + ?Sized,
    {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut streams = self.open_streams()?;
        let mut result = Vec::new();

        if max_count == 0 {
            let len = streams.log.metadata()?.len();
            let mut reader = BufReader::new(&streams.log);
            reader.seek(SeekFrom::Start(HEADER_SIZE))?;
            loop {
                let offset = reader.stream_position()?;
                if offset >= len {
                    break;
                }
                let list = self
                    .codec
                    .read_change_list(&self.location, &mut reader)
                    .map_err(|e| record_error(offset, e))?;
                if filter.accepts(&list) {
                    result.push(list);
                }
            }
        } else if !filter.any_filter_specified() {
            for entry in read_last_index_entries(&mut streams.index, 0, max_count as u64)? {
                result.push(self.load_change_list_at(&mut streams, entry.offset)?);
            }
        } else {
            let mut skip = 0;
            while result.len() < max_count {
                let entries = read_last_index_entries(&mut streams.index, skip, 1)?;
                let Some(entry) = entries.first() else {
                    break;
                };
                let list = self.load_change_list_at(&mut streams, entry.offset)?;
                if filter.accepts(&list) {
                    result.push(list);
                }
                skip += 1;
            }
            // Collected newest first.
            result.reverse();
        }
        Ok(result)
    }

    /// The `count` index entries that end `skip` entries before the tail, oldest first.
    pub fn read_last_index_entries(&self, skip: u64, count: u64) -> Result<Vec<IndexEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut streams = self.open_streams()?;
        read_last_index_entries(&mut streams.index, skip, count)
    }

    /// Number of index entries, taken from the index length.
    pub fn index_entry_count(&self) -> Result<u64> {
        if !self.index_path.exists() {
            return Ok(0);
        }
        Ok(fs::metadata(&self.index_path)?.len() / INDEX_ENTRY_SIZE)
    }

    /// Drop change lists the cache already holds.
    ///
    /// Callers fetching recent history pass it through here before
    /// [`append_change_lists`](Self::append_change_lists), whose duplicate check only
    /// sees the most recent entry. Change lists older than the last cached date are
    /// dropped. Ones dated exactly at it are dropped if an index entry at that date has
    /// the same number.
    pub fn retain_uncached(
        &mut self,
        change_lists: Vec<C::ChangeList>,
    ) -> Result<Vec<C::ChangeList>> {
        if self.is_empty() {
            return Ok(change_lists);
        }
        let last_millis = self.last_cached_date().timestamp_millis();
        let mut streams = self.open_streams()?;

        let mut numbers_at_last = HashSet::new();
        let mut skip = 0;
        loop {
            let entries = read_last_index_entries(&mut streams.index, skip, 1)?;
            match entries.first() {
                Some(entry) if entry.date_millis >= last_millis => {
                    numbers_at_last.insert(entry.number);
                }
                _ => break,
            }
            skip += 1;
        }

        let before = change_lists.len();
        let uncached: Vec<_> = change_lists
            .into_iter()
            .filter(|list| {
                let date_millis = list.commit_date().timestamp_millis();
                date_millis > last_millis
                    || (date_millis == last_millis && !numbers_at_last.contains(&list.number()))
            })
            .collect();
        log::debug!(
            "{} of {} change lists already cached",
            before - uncached.len(),
            before
        );
        Ok(uncached)
    }

    /// Remove both files, leaving an empty cache.
    pub fn clear(&mut self) {
        log::debug!("Clearing cache {}", self.path.display());
        self.delete_files();
    }

    pub(crate) fn load_change_list_at(
        &self,
        streams: &mut CacheStreams,
        offset: u64,
    ) -> Result<C::ChangeList> {
        streams.log.seek(SeekFrom::Start(offset))?;
        self.codec
            .read_change_list(&self.location, &mut streams.log)
            .map_err(|e| record_error(offset, e))
    }

    /// Index entries not yet marked completely downloaded, newest first.
    ///
    /// They form a contiguous run at the tail, so the scan stops at the first complete entry.
    pub(crate) fn incoming_index_entries(
        &self,
        streams: &mut CacheStreams,
    ) -> Result<Vec<LocatedIndexEntry>> {
        let len = streams.index.metadata()?.len();
        let total = len / INDEX_ENTRY_SIZE;
        let mut incoming = Vec::new();
        for i in 0..total {
            let index_offset = len - (i + 1) * INDEX_ENTRY_SIZE;
            streams.index.seek(SeekFrom::Start(index_offset))?;
            let entry = IndexEntry::read_from(&mut streams.index)?;
            if entry.completely_downloaded {
                break;
            }
            incoming.push(LocatedIndexEntry {
                index_offset,
                entry,
            });
        }
        Ok(incoming)
    }

    /// Number of change lists [`load_incoming_change_lists`](Self::load_incoming_change_lists)
    /// would return, read from the index alone.
    pub fn incoming_count(&self) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let mut streams = self.open_streams()?;
        Ok(self.incoming_index_entries(&mut streams)?.len())
    }

    /// Change lists cached but not yet confirmed complete, oldest first.
    pub fn load_incoming_change_lists(&self) -> Result<Vec<C::ChangeList>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut streams = self.open_streams()?;
        let mut entries = self.incoming_index_entries(&mut streams)?;
        entries.reverse();

        let mut result = Vec::with_capacity(entries.len());
        for located in entries {
            result.push(self.load_change_list_at(&mut streams, located.entry.offset)?);
        }
        Ok(result)
    }

    pub fn has_complete_history(&mut self) -> bool {
        self.load_header();
        self.header.complete_history
    }

    /// Persist the complete-history flag. Setting the current value does no I/O.
    pub fn set_complete_history(&mut self, complete_history: bool) -> Result<()> {
        self.load_header();
        if self.header.complete_history == complete_history {
            return Ok(());
        }
        self.header.complete_history = complete_history;
        let mut streams = self.open_streams()?;
        self.write_header(&mut streams)
    }

    pub fn last_cached_date(&mut self) -> DateTime<Utc> {
        self.load_header();
        DateTime::from_timestamp_millis(self.header.last_cached_millis).unwrap_or_default()
    }

    pub fn first_cached_date(&mut self) -> DateTime<Utc> {
        self.load_header();
        DateTime::from_timestamp_millis(self.header.first_cached_millis).unwrap_or_default()
    }

    pub fn first_cached_change_list(&mut self) -> i64 {
        self.load_header();
        self.header.first_cached_change_list
    }
}

fn read_last_index_entries(index: &mut File, skip: u64, count: u64) -> Result<Vec<IndexEntry>> {
    let len = index.metadata()?.len();
    let total = len / INDEX_ENTRY_SIZE;
    let count = count.min(total.saturating_sub(skip));
    if count == 0 {
        return Ok(Vec::new());
    }

    index.seek(SeekFrom::Start(len - INDEX_ENTRY_SIZE * (count + skip)))?;
    let mut reader = BufReader::new(index);
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        entries.push(IndexEntry::read_from(&mut reader)?);
    }
    Ok(entries)
}

fn record_error(offset: u64, error: CacheError) -> CacheError {
    match error {
        CacheError::Json(e) => CacheError::malformed_record(offset, e.to_string()),
        other => other,
    }
}
