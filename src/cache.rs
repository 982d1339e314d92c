use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, WebexError};

/// Cache manager for storing tokens on disk
#[derive(Debug, Clone)]
pub struct Cache {
    cache_dir: PathBuf,
}

impl Cache {
    /// Create a cache in the project cache directory
    pub fn new() -> Result<Self> {
        let dirs = Config::project_dirs()
            .ok_or_else(|| WebexError::Storage("Could not determine cache directory".into()))?;
        Self::with_dir(dirs.cache_dir())
    }

    /// Create a cache rooted at `cache_dir`
    pub fn with_dir(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn file_path(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    /// Save data to cache, readable by the current user only
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(data)?;
        write_private(&self.file_path(filename), content.as_bytes())?;
        Ok(())
    }

    /// Load data from cache
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Delete a cache file
    pub fn delete(&self, filename: &str) -> Result<()> {
        let path = self.file_path(filename);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Check if a cache file exists
    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).exists()
    }
}

pub const TOKENS_FILE: &str = "tokens.json";

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies to newly created files
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessToken, TokenStore};

    #[test]
    fn save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::with_dir(dir.path()).unwrap();
        assert!(cache.load::<TokenStore>(TOKENS_FILE).unwrap().is_none());

        let store = TokenStore {
            access_token: Some(AccessToken {
                value: "abc".into(),
                expires: 42,
            }),
            refresh_token: None,
        };
        cache.save(TOKENS_FILE, &store).unwrap();
        assert!(cache.exists(TOKENS_FILE));

        let loaded: TokenStore = cache.load(TOKENS_FILE).unwrap().unwrap();
        assert_eq!(loaded.access_token.unwrap().value, "abc");

        cache.delete(TOKENS_FILE).unwrap();
        assert!(!cache.exists(TOKENS_FILE));
    }

    #[cfg(unix)]
    #[test]
    fn saved_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::with_dir(dir.path()).unwrap();
        let path = dir.path().join(TOKENS_FILE);

        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        cache.save(TOKENS_FILE, &TokenStore::default()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
