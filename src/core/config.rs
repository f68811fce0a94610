use crate::core::dirs::{get_cache_directory, get_config_directory};
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Overrides the platform cache directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Number of change lists fetched or shown when no count is given.
    #[serde(default = "default_count")]
    pub default_count: usize,
    /// Whether fetched change lists are stored as completely downloaded.
    #[serde(default = "default_assume_complete")]
    pub assume_complete: bool,
}

fn default_count() -> usize {
    50
}

fn default_assume_complete() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            default_count: default_count(),
            assume_complete: default_assume_complete(),
        }
    }
}

impl CacheConfig {
    pub fn load_or_create() -> Result<Self> {
        let config_file = get_config_directory()?.join(CONFIG_FILE_NAME);
        Self::load_or_create_at(&config_file)
    }

    /// Load the config at `config_file`, writing the defaults there if it does not exist.
    pub fn load_or_create_at(config_file: &Path) -> Result<Self> {
        if config_file.exists() {
            let content = std::fs::read_to_string(config_file)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_at(config_file)?;
            Ok(config)
        }
    }

    pub fn save_at(&self, config_file: &Path) -> Result<()> {
        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_file, content)?;
        Ok(())
    }

    pub fn cache_home(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_cache_directory(),
        }
    }
}
