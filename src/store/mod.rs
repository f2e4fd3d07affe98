//! The persistent key-value store underneath the repository.
//!
//! Values are opaque text. The repository is the only caller; it stores JSON arrays under the
//! collection keys and a literal `true`/`false` under the lock key.

mod file_store;
mod memory_store;

use crate::Result;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Key of the JSON array of received transactions.
pub const RECEIVED_KEY: &str = "@received_transactions";

/// Key of the JSON array of spent transactions.
pub const SPENT_KEY: &str = "@spent_transactions";

/// Key of the app lock flag.
pub const APP_LOCK_KEY: &str = "@app_lock_enabled";

/// A durable mapping from string keys to text values. There are no transactions and no locking:
/// the last `set` for a key wins.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` if nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
