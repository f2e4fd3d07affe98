//! Export command handlers.

use crate::args::{ExportReceivedArgs, ExportSpentArgs};
use crate::commands::{plural, Out};
use crate::export::{to_records, AccountFilter, DateRange};
use crate::model::Transaction;
use crate::{Config, Result};
use chrono::{Datelike, Local, NaiveDate, TimeZone};
use std::path::PathBuf;
use tracing::trace;

/// Exports received transactions, all of them or those of one account.
pub async fn export_received(config: Config, args: ExportReceivedArgs) -> Result<Out<PathBuf>> {
    let filter = AccountFilter::from_option(args.account().map(str::to_string));
    let received = filter.apply(config.repository().list_received().await?);
    let rows: Vec<Transaction> = received.into_iter().map(Transaction::from).collect();
    let path = config
        .exporter()
        .export(&to_records(&rows)?, &filter.file_name())
        .await?;
    Ok(Out::new(
        format!(
            "Exported {} received transaction{} to {}",
            rows.len(),
            plural(rows.len()),
            path.display()
        ),
        path,
    ))
}

/// Exports spent transactions dated within a range of days in the local time zone. The range
/// defaults to January 1st of this year through today.
pub async fn export_spent(config: Config, args: ExportSpentArgs) -> Result<Out<PathBuf>> {
    export_spent_in(config, args, &Local).await
}

pub(crate) async fn export_spent_in<Tz: TimeZone>(
    config: Config,
    args: ExportSpentArgs,
    tz: &Tz,
) -> Result<Out<PathBuf>> {
    let today = tz.from_utc_datetime(&chrono::Utc::now().naive_utc()).date_naive();
    let from = args
        .from()
        .or_else(|| NaiveDate::from_ymd_opt(today.year(), 1, 1))
        .unwrap_or(today);
    let range = DateRange::new(from, args.to().unwrap_or(today));
    trace!("Exporting spent transactions in {range:?}");

    let spent = range.apply(config.repository().list_spent().await?, tz);
    let rows: Vec<Transaction> = spent.into_iter().map(Transaction::from).collect();
    let path = config
        .exporter()
        .export(&to_records(&rows)?, &range.file_name())
        .await?;
    Ok(Out::new(
        format!(
            "Exported {} spent transaction{} to {}",
            rows.len(),
            plural(rows.len()),
            path.display()
        ),
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::model::SpentDraft;
    use crate::test::TestEnv;
    use crate::utils;
    use chrono::Utc;

    #[tokio::test]
    async fn test_export_received_for_one_account() {
        let env = TestEnv::new().await;
        env.insert_received("Mahis account", "5000", 1).await;
        env.insert_received("Amma account", "10", 2).await;

        let out = export_received(
            env.config(),
            ExportReceivedArgs::new(Some("Mahis account".to_string())),
        )
        .await
        .unwrap();
        let path = out.structure().unwrap();
        assert!(path.ends_with("received_export_Mahis account.csv"));
        let text = utils::read(path).await.unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Mahis account"));
        assert!(!text.contains("Amma account"));
    }

    #[tokio::test]
    async fn test_export_received_no_data() {
        let env = TestEnv::new().await;
        env.insert_received("Amma account", "10", 2).await;
        let e = export_received(
            env.config(),
            ExportReceivedArgs::new(Some("Appa account".to_string())),
        )
        .await
        .unwrap_err();
        assert!(matches!(LedgerError::of(&e), Some(LedgerError::NoData)));
        assert!(!env
            .config()
            .exports()
            .join("received_export_Appa account.csv")
            .exists());
    }

    #[tokio::test]
    async fn test_export_spent_range() {
        let env = TestEnv::new().await;
        env.insert_spent("Landlord", "1200", 5).await;
        env.insert_spent("Grocer", "50", 20).await;

        let args = ExportSpentArgs::new(
            NaiveDate::from_ymd_opt(2025, 3, 1),
            NaiveDate::from_ymd_opt(2025, 3, 10),
        );
        let out = export_spent_in(env.config(), args, &Utc).await.unwrap();
        let path = out.structure().unwrap();
        assert!(path.ends_with("spent_export_2025-03-01_to_2025-03-10.csv"));
        let text = utils::read(path).await.unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Landlord"));
        assert!(out.message().starts_with("Exported 1 spent transaction to"));
    }

    #[tokio::test]
    async fn test_export_spent_default_range_is_this_year() {
        let env = TestEnv::new().await;
        env.repository()
            .append_spent(SpentDraft::new("Checking", "Cafe", "4.5", Utc::now()))
            .await
            .unwrap();
        let today = Utc::now().date_naive();

        let out = export_spent_in(env.config(), ExportSpentArgs::new(None, None), &Utc)
            .await
            .unwrap();
        let expected = format!("spent_export_{}-01-01_to_{}.csv", today.year(), today);
        assert!(out.structure().unwrap().ends_with(expected));
    }
}
