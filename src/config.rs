//! Configuration file handling for the ledger.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json` and holds the list of accounts
//! that income can be filed under and the backup settings.

use crate::backup::Backup;
use crate::export::Exporter;
use crate::repository::TransactionRepository;
use crate::store::FileStore;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const APP_NAME: &str = "pocket-ledger";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const STORE: &str = "store";
const EXPORTS: &str = "exports";
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const DEFAULT_ACCOUNTS: [&str; 4] = ["Mahis account", "Manis account", "Amma account", "Appa account"];

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`. It provides
/// paths to the directories that are expected in a certain location within the ledger home
/// directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    store: PathBuf,
    exports: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and an initial `config.json` file with
    /// default settings. An existing `config.json` is left alone and loaded instead, so running
    /// this twice is harmless.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/pocket-ledger`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;

        // Canonicalize the directory path
        let root = utils::canonicalize(&maybe_relative).await?;

        // Create the subdirectories
        for sub in [STORE, EXPORTS, BACKUPS] {
            utils::make_dir(root.join(sub)).await?;
        }

        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            let config_file = ConfigFile::default();
            config_file.save(&config_path).await?;
            config_file
        };

        Ok(Self::new(root, config_path, config_file))
    }

    /// This will
    /// - validate that the `ledger_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the store, exports and backups directories exist
    /// - return the loaded configuration object
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = ledger_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Ledger Home is missing, run `ledger init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self::new(root, config_path, config_file);
        for dir in [&config.store, &config.exports, &config.backups] {
            if !dir.is_dir() {
                bail!("The directory '{}' is missing", dir.display())
            }
        }
        Ok(config)
    }

    fn new(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Self {
        Self {
            store: root.join(STORE),
            exports: root.join(EXPORTS),
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    pub fn exports(&self) -> &Path {
        &self.exports
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// The accounts a received transaction can be filed under, in display order.
    pub fn accounts(&self) -> &[String] {
        &self.config_file.accounts
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Creates a repository over the files in the store directory.
    pub fn repository(&self) -> TransactionRepository {
        TransactionRepository::new(
            Arc::new(FileStore::new(&self.store)),
            self.config_file.accounts.clone(),
        )
    }

    /// Creates an `Exporter` that writes into the exports directory.
    pub fn exporter(&self) -> Exporter {
        Exporter::new(&self.exports)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pocket-ledger",
///   "config_version": 1,
///   "accounts": ["Mahis account", "Manis account", "Amma account", "Appa account"],
///   "backup_copies": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pocket-ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The accounts income can be filed under
    #[serde(default = "default_accounts")]
    accounts: Vec<String>,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,
}

fn default_accounts() -> Vec<String> {
    DEFAULT_ACCOUNTS.iter().map(|s| s.to_string()).collect()
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            accounts: default_accounts(),
            backup_copies: BACKUP_COPIES,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it is not a ledger config
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Unable to load the config file")?;

        // Validate app_name
        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.accounts.iter().any(|a| !a.trim().is_empty()),
            "The config file at {} must list at least one account",
            path.display()
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    #[cfg(test)]
    /// Creates a new ConfigFile with the specified settings.
    pub fn new(accounts: Vec<String>, backup_copies: u32) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            accounts,
            backup_copies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("ledger_home");

        // Run the function under test:
        let config = Config::create(&home_dir).await.unwrap();

        assert_eq!(config.accounts(), default_accounts().as_slice());
        assert_eq!(config.backup_copies(), 5);
        assert!(config.store().is_dir());
        assert!(config.exports().is_dir());
        assert!(config.backups().is_dir());
        assert!(config.config_path().is_file());

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.root(), config.root());
        assert_eq!(loaded.accounts(), config.accounts());
    }

    #[tokio::test]
    async fn test_config_create_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        utils::make_dir(&home).await.unwrap();
        ConfigFile::new(vec!["Savings".to_string()], 2)
            .save(home.join(CONFIG_JSON))
            .await
            .unwrap();

        let config = Config::create(&home).await.unwrap();
        assert_eq!(config.accounts(), &["Savings".to_string()]);
        assert_eq!(config.backup_copies(), 2);
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let e = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(e.to_string().contains("ledger init"));
    }

    #[tokio::test]
    async fn test_config_load_missing_directory() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).await.unwrap();
        tokio::fs::remove_dir(config.exports()).await.unwrap();
        assert!(Config::load(dir.path()).await.is_err());
    }

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.app_name, "pocket-ledger");
        assert_eq!(config.backup_copies, 5);
        assert_eq!(config.accounts[0], "Mahis account");
        assert_eq!(config.accounts.len(), 4);
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = ConfigFile::new(vec!["A".to_string(), "B".to_string()], 7);
        original_config.save(&config_path).await.unwrap();
        let loaded_config = ConfigFile::load(&config_path).await.unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(
            &config_path,
            r#"{ "app_name": "pocket-ledger", "config_version": 1 }"#,
        )
        .await
        .unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.accounts, default_accounts());
        assert_eq!(config.backup_copies, 5);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(
            &config_path,
            r#"{ "app_name": "wrong_app", "config_version": 1, "backup_copies": 5 }"#,
        )
        .await
        .unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_rejects_empty_accounts() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        ConfigFile::new(vec![], 5).save(&config_path).await.unwrap();
        assert!(ConfigFile::load(&config_path).await.is_err());
    }
}
