//! Derived figures for received transactions. Nothing here is stored.

use crate::error::LedgerError;
use crate::model::{Amount, Dated, ReceivedTransaction, SubExpense};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What has been spent out of a received transaction and what is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub total_spent: Amount,
    /// May be negative when sub-expenses exceed the amount received.
    pub balance: Amount,
}

/// Fails with `LedgerError::Overflow` when the sum or the difference leaves the range of `Amount`.
pub fn compute_balance(transaction: &ReceivedTransaction) -> Result<Balance> {
    let overflow = || LedgerError::Overflow {
        id: transaction.id().to_string(),
    };
    let total_spent = transaction
        .expenses()
        .iter()
        .map(SubExpense::amount)
        .try_fold(Amount::ZERO, Amount::checked_add)
        .ok_or_else(overflow)?;
    let balance = transaction
        .amount()
        .checked_sub(total_spent)
        .ok_or_else(overflow)?;
    Ok(Balance {
        total_spent,
        balance,
    })
}

/// The sub-expenses in display order. Equal timestamps keep their stored order.
pub fn expenses_newest_first(transaction: &ReceivedTransaction) -> Vec<&SubExpense> {
    let mut expenses: Vec<&SubExpense> = transaction.expenses().iter().collect();
    expenses.sort_by(|a, b| b.date().cmp(&a.date()));
    expenses
}

/// Sorts list items by date, newest first.
pub fn newest_first<T: Dated>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| b.date().cmp(&a.date()));
    items
}

/// A received transaction as the list and detail views show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedSummary {
    pub id: String,
    pub account: String,
    pub amount: Amount,
    #[serde(with = "crate::model::iso8601")]
    pub date: DateTime<Utc>,
    pub notes: String,
    pub total_spent: Amount,
    pub balance: Amount,
    pub expenses: Vec<SubExpense>,
}

impl TryFrom<&ReceivedTransaction> for ReceivedSummary {
    type Error = crate::Error;

    fn try_from(transaction: &ReceivedTransaction) -> Result<Self> {
        let Balance {
            total_spent,
            balance,
        } = compute_balance(transaction)?;
        Ok(Self {
            id: transaction.id().to_string(),
            account: transaction.account().to_string(),
            amount: transaction.amount(),
            date: transaction.date(),
            notes: transaction.notes().to_string(),
            total_spent,
            balance,
            expenses: expenses_newest_first(transaction)
                .into_iter()
                .cloned()
                .collect(),
        })
    }
}
