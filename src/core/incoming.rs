//! Matching locally updated files against incoming change lists.
//!
//! An incoming change list is promoted to completely downloaded only when every one
//! of its file changes has been seen in the update report, and only if the report
//! contained no file under the cache root that no incoming change list explains.

use crate::core::cache_file::{CacheStreams, ChangesCacheFile};
use crate::core::change_list::{ChangeListCodec, CommittedChangeList};
use crate::core::error::Result;
use crate::core::index::LocatedIndexEntry;
use crate::core::updated_files::{FileGroup, UpdatedFile, UpdatedFiles};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::{Seek, SeekFrom};

/// An incomplete change list loaded for one reconciliation pass.
struct IncomingChangeListData<L> {
    located: LocatedIndexEntry,
    change_list: L,
    /// Positions in `change_list.changes()` matched by an updated file.
    accounted_changes: HashSet<usize>,
}

impl<L: CommittedChangeList> IncomingChangeListData<L> {
    fn is_fully_accounted(&self) -> bool {
        self.accounted_changes.len() == self.change_list.changes().len()
    }
}

impl<C: ChangeListCodec> ChangesCacheFile<C> {
    /// Mark incoming change lists whose changes all appear in `updated_files` as
    /// completely downloaded.
    ///
    /// Returns `true` when some updated file under the root is not explained by any
    /// incoming change list; nothing is promoted in that case. The complete-history
    /// flag in the header is not touched.
    pub fn reconcile_updated_files(&self, updated_files: &UpdatedFiles) -> Result<bool> {
        if !self.path().exists() {
            log::debug!("No cache at {}, nothing to reconcile", self.path().display());
            return Ok(self.has_unaccounted_files(updated_files));
        }
        let mut streams = self.open_streams()?;
        let mut incoming = self.load_incoming_data(&mut streams)?;

        let mut have_unaccounted = false;
        for group in updated_files.top_level_groups() {
            have_unaccounted |= self.process_group(group, &mut incoming);
        }

        if have_unaccounted {
            log::debug!("Updated files include changes not known to the cache");
            return Ok(true);
        }

        for data in incoming.iter().filter(|data| data.is_fully_accounted()) {
            log::debug!(
                "Change list {} is now completely downloaded",
                data.located.entry.number
            );
            streams
                .index
                .seek(SeekFrom::Start(data.located.index_offset))?;
            data.located
                .entry
                .with_completely_downloaded(true)
                .write_to(&mut streams.index)?;
        }
        Ok(false)
    }

    fn load_incoming_data(
        &self,
        streams: &mut CacheStreams,
    ) -> Result<Vec<IncomingChangeListData<C::ChangeList>>> {
        let entries = self.incoming_index_entries(streams)?;
        let mut incoming = Vec::with_capacity(entries.len());
        for located in entries {
            let change_list = self.load_change_list_at(streams, located.entry.offset)?;
            incoming.push(IncomingChangeListData {
                located,
                change_list,
                accounted_changes: HashSet::new(),
            });
        }
        Ok(incoming)
    }

    fn process_group(
        &self,
        group: &FileGroup,
        incoming: &mut [IncomingChangeListData<C::ChangeList>],
    ) -> bool {
        let mut have_unaccounted = false;
        for file in &group.files {
            have_unaccounted |= self.process_file(file, incoming);
        }
        for child in &group.children {
            have_unaccounted |= self.process_group(child, incoming);
        }
        have_unaccounted
    }

    /// Records every incoming change that produced `file`. Returns `true` if none did.
    fn process_file(
        &self,
        file: &UpdatedFile,
        incoming: &mut [IncomingChangeListData<C::ChangeList>],
    ) -> bool {
        if !file.path.starts_with(self.root_path()) {
            return false;
        }

        let mut found = false;
        for data in incoming.iter_mut() {
            for (position, change) in data.change_list.changes().iter().enumerate() {
                let Some(after) = &change.after else {
                    continue;
                };
                if after.path == file.path
                    && self.comparator().compare(&file.revision, &after.revision)
                        == Ordering::Equal
                {
                    found = true;
                    data.accounted_changes.insert(position);
                }
            }
        }
        !found
    }

    /// Without a cache every updated file under the root is unaccounted for.
    fn has_unaccounted_files(&self, updated_files: &UpdatedFiles) -> bool {
        fn any_under(group: &FileGroup, root: &std::path::Path) -> bool {
            group.files.iter().any(|f| f.path.starts_with(root))
                || group.children.iter().any(|child| any_under(child, root))
        }
        updated_files
            .top_level_groups()
            .iter()
            .any(|group| any_under(group, self.root_path()))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::cache_file::ChangesCacheFile;
    use crate::core::change_list::{
        Change, ContentRevision, NumericRevisionComparator, RepositoryLocation,
    };
    use crate::core::codec::{ChangeListRecord, JsonRecordCodec};
    use crate::core::error::Result;
    use crate::core::updated_files::{FileGroup, UpdatedFiles};
    use chrono::DateTime;
    use tempfile::TempDir;

    fn record(number: i64, minute: i64, files: &[(&str, &str)]) -> ChangeListRecord {
        let date = DateTime::from_timestamp(1_700_000_000 + minute * 60, 0).unwrap();
        let changes = files
            .iter()
            .map(|(path, rev)| Change::added(ContentRevision::new(*path, *rev)))
            .collect();
        ChangeListRecord::new(number, date, changes)
    }

    fn setup_cache() -> (TempDir, ChangesCacheFile<JsonRecordCodec>) {
        let temp_dir = TempDir::new().unwrap();
        let cache = ChangesCacheFile::new(
            temp_dir.path().join("changes"),
            JsonRecordCodec,
            "/repo",
            RepositoryLocation::new("origin"),
        );
        (temp_dir, cache)
    }

    fn report(files: &[(&str, &str)]) -> UpdatedFiles {
        let group = files
            .iter()
            .fold(FileGroup::new("UPDATED"), |group, (path, rev)| {
                group.with_file(*path, *rev)
            });
        UpdatedFiles::new(vec![group])
    }

    fn completeness(cache: &ChangesCacheFile<JsonRecordCodec>) -> Result<Vec<(i64, bool)>> {
        Ok(cache
            .read_last_index_entries(0, 100)?
            .iter()
            .map(|e| (e.number, e.completely_downloaded))
            .collect())
    }

    #[test]
    fn test_incoming_lists_are_oldest_first() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(
            vec![
                record(12, 3, &[("/repo/c.txt", "12")]),
                record(10, 1, &[("/repo/a.txt", "10")]),
                record(11, 2, &[("/repo/b.txt", "11")]),
            ],
            false,
        )?;

        let incoming = cache.load_incoming_change_lists()?;
        let numbers: Vec<i64> = incoming.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![10, 11, 12]);
        Ok(())
    }

    #[test]
    fn test_incoming_scan_stops_at_complete_entry() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(vec![record(1, 1, &[("/repo/a", "1")])], false)?;
        cache.append_change_lists(vec![record(2, 2, &[("/repo/b", "2")])], true)?;
        cache.append_change_lists(vec![record(3, 3, &[("/repo/c", "3")])], false)?;

        let numbers: Vec<i64> = cache
            .load_incoming_change_lists()?
            .iter()
            .map(|l| l.number)
            .collect();
        assert_eq!(numbers, vec![3]);
        Ok(())
    }

    #[test]
    fn test_oldest_incoming_list_promoted() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(
            vec![
                record(10, 1, &[("/repo/a.txt", "10")]),
                record(11, 2, &[("/repo/b.txt", "11")]),
                record(12, 3, &[("/repo/c.txt", "12")]),
            ],
            false,
        )?;

        let unaccounted = cache.reconcile_updated_files(&report(&[("/repo/a.txt", "10")]))?;

        assert!(!unaccounted);
        assert_eq!(
            completeness(&cache)?,
            vec![(10, true), (11, false), (12, false)]
        );
        Ok(())
    }

    #[test]
    fn test_promotion_requires_every_change() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(
            vec![record(
                7,
                1,
                &[("/repo/src/a.rs", "7"), ("/repo/src/b.rs", "7")],
            )],
            false,
        )?;

        let partial = cache.reconcile_updated_files(&report(&[("/repo/src/a.rs", "7")]))?;
        assert!(!partial);
        assert_eq!(completeness(&cache)?, vec![(7, false)]);

        let full = cache.reconcile_updated_files(&report(&[
            ("/repo/src/a.rs", "7"),
            ("/repo/src/b.rs", "7"),
        ]))?;
        assert!(!full);
        assert_eq!(completeness(&cache)?, vec![(7, true)]);
        Ok(())
    }

    #[test]
    fn test_unaccounted_file_blocks_promotion() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(
            vec![record(
                7,
                1,
                &[("/repo/src/a.rs", "7"), ("/repo/src/b.rs", "7")],
            )],
            false,
        )?;

        let unaccounted = cache.reconcile_updated_files(&report(&[
            ("/repo/src/a.rs", "7"),
            ("/repo/src/b.rs", "7"),
            ("/repo/README.md", "7"),
        ]))?;

        assert!(unaccounted);
        assert_eq!(completeness(&cache)?, vec![(7, false)]);
        Ok(())
    }

    #[test]
    fn test_files_outside_root_are_ignored() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(vec![record(1, 1, &[("/repo/a", "1")])], false)?;

        let unaccounted =
            cache.reconcile_updated_files(&report(&[("/repo/a", "1"), ("/elsewhere/x", "9")]))?;

        assert!(!unaccounted);
        assert_eq!(completeness(&cache)?, vec![(1, true)]);
        Ok(())
    }

    #[test]
    fn test_revision_mismatch_is_unaccounted() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(vec![record(1, 1, &[("/repo/a", "1")])], false)?;

        let unaccounted = cache.reconcile_updated_files(&report(&[("/repo/a", "2")]))?;

        assert!(unaccounted);
        assert_eq!(completeness(&cache)?, vec![(1, false)]);
        Ok(())
    }

    #[test]
    fn test_nested_groups_and_shared_paths() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(
            vec![
                record(1, 1, &[("/repo/shared", "5")]),
                record(2, 2, &[("/repo/shared", "5"), ("/repo/other", "2")]),
            ],
            false,
        )?;

        let updated = UpdatedFiles::new(vec![FileGroup::new("UPDATED")
            .with_file("/repo/shared", "5")
            .with_child(FileGroup::new("MERGED").with_file("/repo/other", "2"))]);
        let unaccounted = cache.reconcile_updated_files(&updated)?;

        assert!(!unaccounted);
        assert_eq!(completeness(&cache)?, vec![(1, true), (2, true)]);
        Ok(())
    }

    #[test]
    fn test_custom_revision_comparator() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut cache = ChangesCacheFile::new(
            temp_dir.path().join("changes"),
            JsonRecordCodec,
            "/repo",
            RepositoryLocation::new("origin"),
        )
        .with_revision_comparator(NumericRevisionComparator);
        cache.append_change_lists(vec![record(1, 1, &[("/repo/a", "0042")])], false)?;

        let unaccounted = cache.reconcile_updated_files(&report(&[("/repo/a", "42")]))?;

        assert!(!unaccounted);
        assert_eq!(completeness(&cache)?, vec![(1, true)]);
        Ok(())
    }

    #[test]
    fn test_reconcile_leaves_header_untouched() -> Result<()> {
        let (_temp_dir, mut cache) = setup_cache();
        cache.append_change_lists(vec![record(1, 1, &[("/repo/a", "1")])], false)?;
        let header_before = std::fs::read(cache.path())?[..30].to_vec();

        cache.reconcile_updated_files(&report(&[("/repo/a", "1")]))?;

        let header_after = std::fs::read(cache.path())?[..30].to_vec();
        assert_eq!(header_before, header_after);
        assert!(!cache.has_complete_history());
        Ok(())
    }

    #[test]
    fn test_reconcile_without_cache() -> Result<()> {
        let (_temp_dir, cache) = setup_cache();
        assert!(cache.reconcile_updated_files(&report(&[("/repo/a", "1")]))?);
        assert!(!cache.reconcile_updated_files(&report(&[("/tmp/a", "1")]))?);
        assert!(!cache.path().exists());
        Ok(())
    }
}
