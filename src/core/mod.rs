//! Core functionality for the change-list cache.
//!
//! This module holds the storage engine (log, index and header), the contracts it
//! expects from a version-control provider, and the pieces the command-line shell
//! is built from.

pub mod cache_file;
pub mod change_list;
pub mod codec;
pub mod command_init;
pub mod config;
pub mod dirs;
pub mod error;
pub mod filter;
pub mod git;
pub mod header;
pub mod incoming;
pub mod index;
pub mod output;
pub mod updated_files;

// === Error handling ===
pub use error::{CacheError, Result};

// === Storage engine ===
// The log/index file pair and its fixed-size records
pub use cache_file::{CacheStreams, ChangesCacheFile};
pub use header::{Header, HeaderLoad, FORMAT_VERSION, HEADER_SIZE};
pub use index::{IndexEntry, INDEX_ENTRY_SIZE};

// === Provider contracts ===
// What the cache needs from a version-control backend
pub use change_list::{
    Change, ChangeListCodec, CommittedChangeList, ContentRevision, ExactRevisionComparator,
    NumericRevisionComparator, RepositoryLocation, RevisionComparator,
};
pub use codec::{ChangeListRecord, JsonRecordCodec};
pub use filter::{ChangeBrowserSettings, ChangeListFilter};
pub use updated_files::{FileGroup, UpdatedFile, UpdatedFiles};

// === Git provider ===
pub use git::GitRepo;

// === Command support ===
pub use command_init::{CacheCommandContext, CacheCommandInit};
pub use config::CacheConfig;
pub use output::{print_error, print_info, print_section_header, print_success, print_warning};
