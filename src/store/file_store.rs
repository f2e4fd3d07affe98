use crate::store::KeyValueStore;
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Stores each key as one file inside a directory, e.g. `@spent_transactions` is kept in
/// `spent_transactions.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store over `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file that holds `key`.
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        trace!("get '{key}' from {}", path.display());
        utils::read_optional(&path)
            .await
            .with_context(|| format!("Unable to read the value of '{key}'"))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key);
        trace!("set '{key}' in {}", path.display());
        utils::replace(&path, value)
            .await
            .with_context(|| format!("Unable to store the value of '{key}'"))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        trace!("remove '{key}' at {}", path.display());
        utils::remove(&path)
            .await
            .with_context(|| format!("Unable to remove the value of '{key}'"))
    }
}

fn file_name(key: &str) -> String {
    let stem: String = key
        .strip_prefix('@')
        .unwrap_or(key)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{APP_LOCK_KEY, RECEIVED_KEY};
    use tempfile::TempDir;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(RECEIVED_KEY), "received_transactions.json");
        assert_eq!(file_name("@a/b c"), "a_b_c.json");
        assert_eq!(file_name("plain-key"), "plain-key.json");
    }

    #[tokio::test]
    async fn test_get_set_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get(APP_LOCK_KEY).await.unwrap(), None);

        store.set(APP_LOCK_KEY, "true").await.unwrap();
        assert_eq!(store.get(APP_LOCK_KEY).await.unwrap().as_deref(), Some("true"));
        assert!(dir.path().join("app_lock_enabled.json").is_file());

        store.set(APP_LOCK_KEY, "false").await.unwrap();
        assert_eq!(store.get(APP_LOCK_KEY).await.unwrap().as_deref(), Some("false"));

        store.remove(APP_LOCK_KEY).await.unwrap();
        store.remove(APP_LOCK_KEY).await.unwrap();
        assert_eq!(store.get(APP_LOCK_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nope"));
        let e = store.set(RECEIVED_KEY, "[]").await.unwrap_err();
        assert!(format!("{e:#}").contains("@received_transactions"));
    }
}
