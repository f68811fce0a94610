//! Change list fixtures and predefined cache scenarios

#![allow(dead_code)]

use changes_cache::{
    Change, ChangeListRecord, ChangesCacheFile, ContentRevision, JsonRecordCodec,
    RepositoryLocation,
};
use chrono::DateTime;
use std::path::Path;

pub const ROOT: &str = "/work/project";

/// A change list committed `minute` minutes after a fixed base time, adding one
/// file per `(relative path, revision)` pair under [`ROOT`].
pub fn change_list(number: i64, minute: i64, files: &[(&str, &str)]) -> ChangeListRecord {
    let date = DateTime::from_timestamp(1_700_000_000 + minute * 60, 0).unwrap();
    let changes = files
        .iter()
        .map(|(path, rev)| Change::added(ContentRevision::new(Path::new(ROOT).join(path), *rev)))
        .collect();
    ChangeListRecord::new(number, date, changes)
        .with_author(if number % 2 == 0 { "alice" } else { "bob" })
        .with_comment(format!("Change {number}"))
}

/// A cache rooted at [`ROOT`] whose files live in `dir`.
pub fn open_cache(dir: &Path) -> ChangesCacheFile<JsonRecordCodec> {
    ChangesCacheFile::new(
        dir.join("changes"),
        JsonRecordCodec,
        ROOT,
        RepositoryLocation::new("https://example.com/project.git"),
    )
}
