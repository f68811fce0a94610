//! Contracts between the cache and the version-control provider.
//!
//! The cache never looks inside a change list except through [`CommittedChangeList`],
//! and it never knows how a change list is laid out on disk: that is the job of the
//! injected [`ChangeListCodec`]. Revision identifiers are compared through an
//! injected [`RevisionComparator`] because their ordering is provider-specific.

use crate::core::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Identifies the remote repository a cache belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryLocation(String);

impl RepositoryLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One side of a file change: the file and the revision it was at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRevision {
    pub path: PathBuf,
    pub revision: String,
}

impl ContentRevision {
    pub fn new(path: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            revision: revision.into(),
        }
    }
}

/// A single file-level change. Additions have no `before`, deletions no `after`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub before: Option<ContentRevision>,
    pub after: Option<ContentRevision>,
}

impl Change {
    pub fn added(after: ContentRevision) -> Self {
        Self {
            before: None,
            after: Some(after),
        }
    }

    pub fn modified(before: ContentRevision, after: ContentRevision) -> Self {
        Self {
            before: Some(before),
            after: Some(after),
        }
    }

    pub fn deleted(before: ContentRevision) -> Self {
        Self {
            before: Some(before),
            after: None,
        }
    }
}

/// Read-only view of a committed change list.
pub trait CommittedChangeList {
    /// Provider-specific change list number.
    fn number(&self) -> i64;

    fn commit_date(&self) -> DateTime<Utc>;

    fn author(&self) -> &str;

    fn comment(&self) -> &str;

    fn changes(&self) -> &[Change];
}

/// Serializes single change lists to and from the log.
///
/// Records must be self-delimiting: after `read_change_list` returns, the source
/// is positioned at the start of the next record.
pub trait ChangeListCodec {
    type ChangeList: CommittedChangeList;

    fn write_change_list(&self, sink: &mut dyn Write, list: &Self::ChangeList) -> Result<()>;

    fn read_change_list(
        &self,
        location: &RepositoryLocation,
        source: &mut dyn Read,
    ) -> Result<Self::ChangeList>;
}

/// Orders revision identifiers the way the provider does.
pub trait RevisionComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering;
}

/// Revisions are equal only when their text is equal. Suits hash-named revisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactRevisionComparator;

impl RevisionComparator for ExactRevisionComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        left.cmp(right)
    }
}

/// Compares revisions numerically when both parse as integers, textually otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericRevisionComparator;

impl RevisionComparator for NumericRevisionComparator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        match (left.trim().parse::<u64>(), right.trim().parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => left.cmp(right),
        }
    }
}
