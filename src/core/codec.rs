//! Length-prefixed JSON record codec.
//!
//! Each record is a big-endian `u32` payload length followed by the JSON encoding of a
//! [`ChangeListRecord`]. The prefix makes records self-delimiting, so a reader can walk
//! the log sequentially without any index.

use crate::core::change_list::{
    Change, ChangeListCodec, CommittedChangeList, RepositoryLocation,
};
use crate::core::error::{CacheError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Upper bound on a single serialized record.
pub const MAX_RECORD_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeListRecord {
    pub number: i64,
    pub commit_date: DateTime<Utc>,
    pub author: String,
    pub comment: String,
    pub changes: Vec<Change>,
    /// Filled in from the read context, never persisted.
    #[serde(skip)]
    pub location: Option<RepositoryLocation>,
}

impl ChangeListRecord {
    pub fn new(number: i64, commit_date: DateTime<Utc>, changes: Vec<Change>) -> Self {
        Self {
            number,
            commit_date,
            author: String::new(),
            comment: String::new(),
            changes,
            location: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl CommittedChangeList for ChangeListRecord {
    fn number(&self) -> i64 {
        self.number
    }

    fn commit_date(&self) -> DateTime<Utc> {
        self.commit_date
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn comment(&self) -> &str {
        &self.comment
    }

    fn changes(&self) -> &[Change] {
        &self.changes
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordCodec;

impl ChangeListCodec for JsonRecordCodec {
    type ChangeList = ChangeListRecord;

    fn write_change_list(&self, sink: &mut dyn Write, list: &ChangeListRecord) -> Result<()> {
        let payload = serde_json::to_vec(list)?;
        if payload.len() > MAX_RECORD_SIZE {
            return Err(CacheError::record_too_large(payload.len(), MAX_RECORD_SIZE));
        }

        // One write keeps prefix and payload together in the sink.
        let mut buf = Vec::with_capacity(4 + payload.len());
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(&payload);
        sink.write_all(&buf)?;
        Ok(())
    }

    fn read_change_list(
        &self,
        location: &RepositoryLocation,
        source: &mut dyn Read,
    ) -> Result<ChangeListRecord> {
        let mut len = [0u8; 4];
        source.read_exact(&mut len)?;
        let len = u32::from_be_bytes(len) as usize;
        if len > MAX_RECORD_SIZE {
            return Err(CacheError::record_too_large(len, MAX_RECORD_SIZE));
        }

        let mut payload = vec![0u8; len];
        source.read_exact(&mut payload)?;
        let mut record: ChangeListRecord = serde_json::from_slice(&payload)?;
        record.location = Some(location.clone());
        Ok(record)
    }
}
