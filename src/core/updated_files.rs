//! Report of files touched by an update, as a tree of named groups.
//!
//! Produced by whatever performed the update and consumed by the cache only as
//! (path, revision) pairs. The tree is serde-loadable so a report can be handed
//! over as JSON.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedFile {
    pub path: PathBuf,
    pub revision: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGroup {
    pub name: String,
    #[serde(default)]
    pub files: Vec<UpdatedFile>,
    #[serde(default)]
    pub children: Vec<FileGroup>,
}

impl FileGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        self.files.push(UpdatedFile {
            path: path.into(),
            revision: revision.into(),
        });
        self
    }

    pub fn with_child(mut self, child: FileGroup) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedFiles {
    #[serde(default)]
    pub groups: Vec<FileGroup>,
}

impl UpdatedFiles {
    pub fn new(groups: Vec<FileGroup>) -> Self {
        Self { groups }
    }

    pub fn top_level_groups(&self) -> &[FileGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        fn group_is_empty(group: &FileGroup) -> bool {
            group.files.is_empty() && group.children.iter().all(group_is_empty)
        }
        self.groups.iter().all(group_is_empty)
    }
}
