//! Changes Cache - a local, append-only cache of committed change lists.
//!
//! Previously fetched history is kept in a log file of serialized change lists next to
//! a fixed-size binary index, so recent history can be read from the tail without
//! scanning the log or asking the version-control backend again.
//!
//! # Public API
//! The main interface is re-exported from the [`core`] module:
//! - [`ChangesCacheFile`]: append, read and reconcile cached change lists
//! - Provider contracts: [`ChangeListCodec`], [`CommittedChangeList`], [`RevisionComparator`]
//! - Filtering: [`ChangeListFilter`], [`ChangeBrowserSettings`]
//! - Update reports: [`UpdatedFiles`], [`FileGroup`]
//! - Error handling and result types

pub mod commands;
pub mod core;

pub use core::{
    CacheError,
    ChangeBrowserSettings,
    Change,
    ChangeListCodec,
    ChangeListFilter,
    ChangeListRecord,
    ChangesCacheFile,
    CommittedChangeList,
    ContentRevision,
    ExactRevisionComparator,
    FileGroup,
    GitRepo,
    HeaderLoad,
    IndexEntry,
    JsonRecordCodec,
    NumericRevisionComparator,
    RepositoryLocation,
    Result,
    RevisionComparator,
    UpdatedFile,
    UpdatedFiles,
};
