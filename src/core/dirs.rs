use crate::core::change_list::RepositoryLocation;
use crate::core::error::Result;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "changes-cache";

/// File name of the log inside a per-repository cache directory.
pub const LOG_FILE_NAME: &str = "changes";

pub fn get_config_directory() -> Result<PathBuf> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".config")),
        "macos" => dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Application Support"),
        _ => dirs::config_dir().unwrap_or_default(),
    };

    Ok(base.join(APP_DIR))
}

pub fn get_cache_directory() -> Result<PathBuf> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".cache")),
        "macos" => dirs::home_dir().unwrap_or_default().join("Library/Caches"),
        _ => dirs::cache_dir().unwrap_or_default(),
    };

    Ok(base.join(APP_DIR))
}

/// Log file path for one (root, location) pair under `cache_home`.
///
/// The directory name is an md5 of both so different checkouts of the same
/// repository keep separate caches.
pub fn cache_file_path(cache_home: &Path, root: &Path, location: &RepositoryLocation) -> PathBuf {
    let key = format!("{}|{}", root.to_string_lossy(), location);
    let hash = format!("{:x}", md5::compute(key.as_bytes()));

    log::debug!("cache_file_path: root = {root:?}, location = {location}, hash = {hash}");

    cache_home.join(hash).join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_file_path_is_stable() {
        let location = RepositoryLocation::new("https://example.com/repo.git");
        let first = cache_file_path(Path::new("/cache"), Path::new("/work/repo"), &location);
        let second = cache_file_path(Path::new("/cache"), Path::new("/work/repo"), &location);

        assert_eq!(first, second);
        assert!(first.starts_with("/cache"));
        assert!(first.ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn test_cache_file_path_depends_on_root() {
        let location = RepositoryLocation::new("origin");
        let one = cache_file_path(Path::new("/cache"), Path::new("/work/one"), &location);
        let two = cache_file_path(Path::new("/cache"), Path::new("/work/two"), &location);
        assert_ne!(one, two);
    }

    #[test]
    fn test_directories_are_named_after_the_tool() -> Result<()> {
        assert!(get_cache_directory()?.ends_with(APP_DIR));
        assert!(get_config_directory()?.ends_with(APP_DIR));
        Ok(())
    }
}
