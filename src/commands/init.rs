use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and an initial `config.json` file with the
/// default list of accounts.
///
/// # Arguments
/// - `ledger_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/pocket-ledger`
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(ledger_home: &Path) -> Result<Out<Vec<String>>> {
    let config = Config::create(ledger_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(Out::new(
        format!(
            "Successfully created the ledger directory and config at {}",
            config.root().display()
        ),
        config.accounts().to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert_eq!(out.structure().unwrap().len(), 4);
        assert!(home.join("config.json").is_file());

        // a second run keeps the existing config
        init(&home).await.unwrap();
        Config::load(&home).await.unwrap();
    }
}
