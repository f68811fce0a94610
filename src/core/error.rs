//! Domain-specific error types for the change-list cache.
//!
//! This module defines [`CacheError`] which covers every failure the cache and its
//! command-line shell can report. It uses `thiserror` for the error definitions and
//! offers small constructors for the variants that carry context.
//!
//! # Public API
//! - [`CacheError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, CacheError>`
//!
//! # Error Categories
//! - **Storage**: I/O failures on the log or index file
//! - **Records**: malformed or oversized change-list records
//! - **Git**: repository discovery and history walking
//! - **Environment**: cache/config directories and report files
//!
//! A header written by another format version is not an error; see
//! [`crate::core::header::HeaderLoad`].

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for the change-list cache
#[derive(Error, Debug)]
pub enum CacheError {
    // Storage errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Record errors
    #[error("Change list record of {size} bytes exceeds the {max} byte limit")]
    RecordTooLarge { size: usize, max: usize },

    #[error("Malformed change list record at offset {offset}: {reason}")]
    MalformedRecord { offset: u64, reason: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Git errors
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Git repository error: {0}")]
    GitRepo(#[from] git2::Error),

    #[error("Invalid UTF-8 path in repository")]
    InvalidUtf8Path,

    // Environment errors
    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read updated files report '{path}': {source}")]
    ReportReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid date '{input}'. Use RFC 3339, e.g. 2024-05-01T00:00:00Z")]
    InvalidDate { input: String },
}

/// Convenience type alias for Results using CacheError
pub type Result<T> = std::result::Result<T, CacheError>;

impl CacheError {
    /// Create a record too large error
    pub fn record_too_large(size: usize, max: usize) -> Self {
        Self::RecordTooLarge { size, max }
    }

    /// Create a malformed record error
    pub fn malformed_record(offset: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            offset,
            reason: reason.into(),
        }
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a report read failed error
    pub fn report_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReportReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid date error
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
        }
    }
}
