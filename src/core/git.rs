//! Git-backed provider of committed change lists.
//!
//! This module wraps the `git2` library to turn repository history into
//! [`ChangeListRecord`]s the cache can store, and to describe what an update brought
//! into the work tree as an [`UpdatedFiles`] report.
//!
//! # Public API
//! - [`GitRepo`]: Main interface for reading history from a repository
//!
//! # Numbering
//! Git has no numeric change list ids, so commits are numbered by their position in a
//! reverse topological walk from HEAD: the root commit is 1 and every commit gets a
//! higher number than its ancestors. File revisions are commit ids.

use crate::core::{
    change_list::{Change, ContentRevision, RepositoryLocation},
    codec::ChangeListRecord,
    error::{CacheError, Result},
    updated_files::{FileGroup, UpdatedFiles},
};
use chrono::DateTime;
use git2::{Commit, Delta, Oid, Repository, Sort};
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(GitRepo { repo })
    }

    /// Work tree root. Bare repositories are rejected.
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or(CacheError::NotInGitRepo)
    }

    /// URL of `origin`, or the work tree path when there is no such remote.
    pub fn location(&self) -> Result<RepositoryLocation> {
        if let Ok(remote) = self.repo.find_remote("origin") {
            if let Some(url) = remote.url() {
                return Ok(RepositoryLocation::new(url));
            }
        }
        Ok(RepositoryLocation::new(
            self.workdir()?.to_string_lossy().into_owned(),
        ))
    }

    pub fn get_current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        match head.shorthand() {
            Some(branch_name) if head.is_branch() => Ok(branch_name.to_string()),
            _ => match head.target() {
                Some(oid) => Ok(format!("detached at {}", &oid.to_string()[..7])),
                None => Ok("-none-".to_string()),
            },
        }
    }

    /// Commit ids reachable from HEAD, oldest first. Empty for a repository without commits.
    fn history(&self) -> Result<Vec<Oid>> {
        if self.repo.head().is_err() {
            return Ok(Vec::new());
        }
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push_head()?;
        Ok(revwalk.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// The `count` most recent commits as change list records, oldest first.
    /// A count of zero returns the whole history.
    pub fn fetch_change_lists(&self, count: usize) -> Result<Vec<ChangeListRecord>> {
        let history = self.history()?;
        let skip = if count == 0 {
            0
        } else {
            history.len().saturating_sub(count)
        };
        log::debug!(
            "Reading {} of {} commits",
            history.len() - skip,
            history.len()
        );

        let workdir = self.workdir()?;
        history
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(position, oid)| {
                let commit = self.repo.find_commit(*oid)?;
                self.change_list_for(&commit, position as i64 + 1, &workdir)
            })
            .collect()
    }

    fn change_list_for(
        &self,
        commit: &Commit<'_>,
        number: i64,
        workdir: &Path,
    ) -> Result<ChangeListRecord> {
        let parent_revision = commit.parent_ids().next().map(|oid| oid.to_string());
        let revision = commit.id().to_string();

        let mut changes = Vec::new();
        for (status, old_path, new_path) in self.changed_paths(commit)? {
            let before = match (&old_path, &parent_revision) {
                (Some(path), Some(parent)) => {
                    Some(ContentRevision::new(workdir.join(path), parent.clone()))
                }
                _ => None,
            };
            let after = new_path.map(|path| ContentRevision::new(workdir.join(path), revision.clone()));
            let change = match status {
                Delta::Added => Change { before: None, after },
                Delta::Deleted => Change { before, after: None },
                _ => Change { before, after },
            };
            changes.push(change);
        }

        let date = DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default();
        Ok(ChangeListRecord::new(number, date, changes)
            .with_author(commit.author().name().unwrap_or(""))
            .with_comment(commit.summary().unwrap_or("")))
    }

    /// Files touched by `commit` relative to its first parent.
    fn changed_paths(
        &self,
        commit: &Commit<'_>,
    ) -> Result<Vec<(Delta, Option<PathBuf>, Option<PathBuf>)>> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        Ok(diff
            .deltas()
            .map(|delta| {
                let old = match delta.status() {
                    Delta::Added => None,
                    _ => delta.old_file().path().map(Path::to_path_buf),
                };
                let new = match delta.status() {
                    Delta::Deleted => None,
                    _ => delta.new_file().path().map(Path::to_path_buf),
                };
                (delta.status(), old, new)
            })
            .collect())
    }

    /// Report of every file written by commits after `since` up to HEAD.
    ///
    /// Each commit contributes its own (path, commit id) pairs, so a file touched by
    /// several commits appears once per commit.
    pub fn updated_files_since(&self, since: &str) -> Result<UpdatedFiles> {
        let since = self.repo.revparse_single(since)?.peel_to_commit()?.id();
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push_head()?;
        revwalk.hide(since)?;

        let workdir = self.workdir()?;
        let mut group = FileGroup::new("UPDATED");
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let revision = commit.id().to_string();
            for (_, _, new_path) in self.changed_paths(&commit)? {
                if let Some(path) = new_path {
                    group = group.with_file(workdir.join(path), revision.clone());
                }
            }
        }
        Ok(UpdatedFiles::new(vec![group]))
    }
}
