//! Shared setup for every cache command.
//!
//! This module provides [`CacheCommandInit`] which performs the steps all commands
//! share: locate the git repository, load the configuration and build the
//! [`ChangesCacheFile`] for this work tree and remote.
//!
//! # Public API
//! - [`CacheCommandInit`]: Initializer with static methods
//! - [`CacheCommandContext`]: Initialized context containing all required data

use crate::core::{
    cache_file::ChangesCacheFile,
    codec::JsonRecordCodec,
    config::CacheConfig,
    dirs::cache_file_path,
    error::{CacheError, Result},
    git::GitRepo,
};
use std::env;
use std::fs;

/// Everything a cache command needs
pub struct CacheCommandContext {
    pub git_repo: GitRepo,
    pub config: CacheConfig,
    pub cache: ChangesCacheFile<JsonRecordCodec>,
}

pub struct CacheCommandInit;

impl CacheCommandInit {
    /// Initialize from the current working directory and the user's configuration
    pub fn initialize() -> Result<CacheCommandContext> {
        let current_dir = env::current_dir()?;
        let git_repo = GitRepo::open(&current_dir).map_err(|_| CacheError::NotInGitRepo)?;

        let config = CacheConfig::load_or_create().unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {e}");
            CacheConfig::default()
        });

        Self::initialize_with(git_repo, config)
    }

    /// Initialize for an already opened repository and a given configuration
    pub fn initialize_with(git_repo: GitRepo, config: CacheConfig) -> Result<CacheCommandContext> {
        let root = git_repo.workdir()?;
        let location = git_repo.location()?;
        let cache_path = cache_file_path(&config.cache_home()?, &root, &location);

        if let Some(dir) = cache_path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                log::error!("Failed to create cache directory '{}': {}", dir.display(), e);
                CacheError::cache_directory_creation_failed(dir, e)
            })?;
        }
        log::debug!("Using cache file {}", cache_path.display());

        let cache = ChangesCacheFile::new(cache_path, JsonRecordCodec, root, location);
        Ok(CacheCommandContext {
            git_repo,
            config,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_with_custom_cache_dir() -> Result<()> {
        let repo_dir = TempDir::new()?;
        let cache_dir = TempDir::new()?;
        std::process::Command::new("git")
            .args(["init"])
            .current_dir(repo_dir.path())
            .output()?;

        let config = CacheConfig {
            cache_dir: Some(cache_dir.path().to_path_buf()),
            ..CacheConfig::default()
        };
        let mut context = CacheCommandInit::initialize_with(GitRepo::open(repo_dir.path())?, config)?;

        assert!(context.cache.path().starts_with(cache_dir.path()));
        assert!(context.cache.path().parent().unwrap().is_dir());
        assert!(context.cache.is_empty());
        Ok(())
    }
}
