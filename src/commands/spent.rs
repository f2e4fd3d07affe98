//! Spent transaction command handlers.

use crate::args::SpentAddArgs;
use crate::balance::newest_first;
use crate::commands::{plural, Out};
use crate::model::{Dated, SpentDraft, SpentTransaction};
use crate::{Config, Result};
use chrono::Utc;

pub async fn spent_add(config: Config, args: SpentAddArgs) -> Result<Out<SpentTransaction>> {
    let mut draft = SpentDraft::new(
        args.account(),
        args.recipient(),
        args.amount(),
        args.date().unwrap_or_else(Utc::now),
    );
    draft.notes = args.notes().to_string();

    let created = config.repository().append_spent(draft).await?;
    Ok(Out::new(
        format!(
            "Spent {} from {} to {} ({})",
            created.amount(),
            created.account(),
            created.recipient(),
            created.id()
        ),
        created,
    ))
}

/// Lists spent transactions, newest first.
pub async fn spent_list(config: Config) -> Result<Out<Vec<SpentTransaction>>> {
    let spent = newest_first(config.repository().list_spent().await?);
    let mut lines = vec![format!("{} spent transaction{}", spent.len(), plural(spent.len()))];
    lines.extend(spent.iter().map(|s| {
        format!(
            "{}  {}  {} -> {}  {}",
            s.date().format("%Y-%m-%d"),
            s.amount(),
            s.account(),
            s.recipient(),
            s.id()
        )
    }));
    Ok(Out::new(lines.join("\n"), spent))
}
