use crate::args::WipeArgs;
use crate::backup::{Snapshot, WIPE};
use crate::commands::{plural, Out};
use crate::{Config, Result};
use anyhow::ensure;
use std::path::PathBuf;
use tracing::info;

/// Deletes all received and spent transactions after saving them to a backup file. The app lock
/// setting is kept. Stored data that cannot be read stops the wipe before anything is removed.
pub async fn wipe(config: Config, args: WipeArgs) -> Result<Out<PathBuf>> {
    ensure!(
        args.yes(),
        "This deletes ALL received and spent transactions. Pass --yes to confirm."
    );
    let repo = config.repository();
    let snapshot = Snapshot::new(repo.list_received().await?, repo.list_spent().await?);
    let path = config.backup().save_json(WIPE, &snapshot).await?;
    info!("Saved a backup of {} transaction(s) to {}", snapshot.len(), path.display());

    repo.clear_all().await?;
    Ok(Out::new(
        format!(
            "Deleted {} transaction{}. A backup was saved to {}",
            snapshot.len(),
            plural(snapshot.len()),
            path.display()
        ),
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::store::{FileStore, KeyValueStore, RECEIVED_KEY};
    use crate::test::TestEnv;
    use crate::utils;

    #[tokio::test]
    async fn test_wipe_requires_confirmation() {
        let env = TestEnv::new().await;
        env.insert_spent("Landlord", "1200", 5).await;
        assert!(wipe(env.config(), WipeArgs::new(false)).await.is_err());
        assert_eq!(env.repository().list_spent().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wipe_backs_up_then_clears() {
        let env = TestEnv::new().await;
        let r = env.insert_received("Mahis account", "5000", 1).await;
        let s = env.insert_spent("Landlord", "1200", 5).await;
        env.repository().set_lock_enabled(true).await.unwrap();

        let out = wipe(env.config(), WipeArgs::new(true)).await.unwrap();
        assert!(out.message().starts_with("Deleted 2 transactions"));

        let repo = env.repository();
        assert!(repo.list_received().await.unwrap().is_empty());
        assert!(repo.list_spent().await.unwrap().is_empty());
        assert!(repo.lock_enabled().await.unwrap());

        let snapshot: Snapshot = utils::deserialize(out.structure().unwrap()).await.unwrap();
        assert_eq!(snapshot.received, vec![r]);
        assert_eq!(snapshot.spent, vec![s]);
    }

    #[tokio::test]
    async fn test_wipe_stops_on_corrupt_data() {
        let env = TestEnv::new().await;
        FileStore::new(env.config().store())
            .set(RECEIVED_KEY, "[{")
            .await
            .unwrap();
        let e = wipe(env.config(), WipeArgs::new(true)).await.unwrap_err();
        assert!(LedgerError::of(&e).unwrap().is_corrupt());
    }
}
