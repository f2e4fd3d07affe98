//! Received transaction command handlers.

use crate::args::{ExpenseArgs, IdArgs, ReceivedAddArgs};
use crate::balance::{compute_balance, newest_first, ReceivedSummary};
use crate::commands::{plural, Out};
use crate::model::{ReceivedDraft, SubExpense, SubExpenseDraft};
use crate::{Config, Result};
use anyhow::Context;
use chrono::Utc;

/// Records money received. The account defaults to the first configured account and the date to
/// now.
pub async fn received_add(config: Config, args: ReceivedAddArgs) -> Result<Out<ReceivedSummary>> {
    let account = match args.account() {
        Some(account) => account.to_string(),
        None => config
            .accounts()
            .first()
            .cloned()
            .context("No accounts are configured")?,
    };
    let mut draft = ReceivedDraft::new(account, args.amount(), args.date().unwrap_or_else(Utc::now));
    draft.notes = args.notes().to_string();

    let created = config.repository().append_received(draft).await?;
    let summary = ReceivedSummary::try_from(&created)?;
    Ok(Out::new(
        format!(
            "Received {} into {} ({})",
            summary.amount, summary.account, summary.id
        ),
        summary,
    ))
}

/// Lists received transactions, newest first, each with its balance.
pub async fn received_list(config: Config) -> Result<Out<Vec<ReceivedSummary>>> {
    let received = newest_first(config.repository().list_received().await?);
    let summaries = received
        .iter()
        .map(ReceivedSummary::try_from)
        .collect::<Result<Vec<_>>>()?;

    let mut lines = vec![format!(
        "{} received transaction{}",
        summaries.len(),
        plural(summaries.len())
    )];
    lines.extend(summaries.iter().map(|s| {
        format!(
            "{}  {}  {}  balance {}  {}",
            s.date.format("%Y-%m-%d"),
            s.account,
            s.amount,
            s.balance,
            s.id
        )
    }));
    Ok(Out::new(lines.join("\n"), summaries))
}

/// Shows one received transaction with its expenses, newest first.
pub async fn received_show(config: Config, args: IdArgs) -> Result<Out<ReceivedSummary>> {
    let received = config.repository().find_received(args.id()).await?;
    let s = ReceivedSummary::try_from(&received)?;

    let mut lines = vec![
        format!(
            "{} received into {} on {}",
            s.amount,
            s.account,
            s.date.format("%Y-%m-%d")
        ),
        format!("Spent {}, balance {}", s.total_spent, s.balance),
    ];
    if !s.notes.is_empty() {
        lines.push(format!("Notes: {}", s.notes));
    }
    lines.extend(s.expenses.iter().map(|e| {
        format!(
            "  {}  {}  {}",
            e.date.format("%Y-%m-%d"),
            e.description(),
            e.amount()
        )
    }));
    Ok(Out::new(lines.join("\n"), s))
}

/// Logs an expense against a received transaction.
pub async fn received_expense(config: Config, args: ExpenseArgs) -> Result<Out<SubExpense>> {
    let repo = config.repository();
    let expense = repo
        .append_sub_expense(
            args.id(),
            SubExpenseDraft::new(args.description(), args.amount()),
        )
        .await?;
    let parent = repo.find_received(args.id()).await?;
    let balance = compute_balance(&parent)?;
    Ok(Out::new(
        format!(
            "Added {} for {}, the balance is now {}",
            expense.amount(),
            expense.description(),
            balance.balance
        ),
        expense,
    ))
}
