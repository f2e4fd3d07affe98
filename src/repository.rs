//! The single interface to persisted ledger state.
//!
//! Each collection lives under its own key as a JSON array. Every mutation loads the whole
//! collection, changes it in memory and writes the whole collection back. Two writers racing on the
//! same key lose the earlier write.

use crate::balance::compute_balance;
use crate::error::LedgerError;
use crate::model::{
    ReceivedDraft, ReceivedTransaction, SpentDraft, SpentTransaction, SubExpense, SubExpenseDraft,
    Transaction, TransactionKind,
};
use crate::store::{KeyValueStore, APP_LOCK_KEY, RECEIVED_KEY, SPENT_KEY};
use crate::Result;
use anyhow::Context;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads and writes transactions and the app lock flag.
#[derive(Clone)]
pub struct TransactionRepository {
    store: Arc<dyn KeyValueStore>,
    accounts: Vec<String>,
}

impl fmt::Debug for TransactionRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionRepository")
            .field("accounts", &self.accounts)
            .finish_non_exhaustive()
    }
}

/// The storage key of a collection.
pub fn storage_key(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Received => RECEIVED_KEY,
        TransactionKind::Spent => SPENT_KEY,
    }
}

impl TransactionRepository {
    /// `accounts` are the names a received transaction may be filed under.
    pub fn new(store: Arc<dyn KeyValueStore>, accounts: Vec<String>) -> Self {
        Self { store, accounts }
    }

    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    pub async fn list_received(&self) -> Result<Vec<ReceivedTransaction>> {
        let records = self.load(TransactionKind::Received).await?;
        Ok(records
            .into_iter()
            .filter_map(|t| match t {
                Transaction::Received(r) => Some(r),
                Transaction::Spent(_) => None,
            })
            .collect())
    }

    pub async fn list_spent(&self) -> Result<Vec<SpentTransaction>> {
        let records = self.load(TransactionKind::Spent).await?;
        Ok(records
            .into_iter()
            .filter_map(|t| match t {
                Transaction::Spent(s) => Some(s),
                Transaction::Received(_) => None,
            })
            .collect())
    }

    /// Every record of `kind`, in stored order.
    pub async fn list(&self, kind: TransactionKind) -> Result<Vec<Transaction>> {
        self.load(kind).await
    }

    pub async fn append_received(&self, draft: ReceivedDraft) -> Result<ReceivedTransaction> {
        let record = draft.validate(&self.accounts)?;
        self.append(Transaction::Received(record.clone())).await?;
        Ok(record)
    }

    pub async fn append_spent(&self, draft: SpentDraft) -> Result<SpentTransaction> {
        let record = draft.validate()?;
        self.append(Transaction::Spent(record.clone())).await?;
        Ok(record)
    }

    /// Returns the first record of `kind` with `id`.
    pub async fn find_by_id(&self, kind: TransactionKind, id: &str) -> Result<Transaction> {
        self.load(kind)
            .await?
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| LedgerError::not_found(kind, id).into())
    }

    pub async fn find_received(&self, id: &str) -> Result<ReceivedTransaction> {
        self.list_received()
            .await?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| LedgerError::not_found(TransactionKind::Received, id).into())
    }

    /// Replaces the notes of the first record of `kind` with `id` and returns the updated record.
    pub async fn update_notes(
        &self,
        kind: TransactionKind,
        id: &str,
        notes: impl Into<String>,
    ) -> Result<Transaction> {
        let mut records = self.load(kind).await?;
        let record = records
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| LedgerError::not_found(kind, id))?;
        record.set_notes(notes.into());
        let updated = record.clone();
        self.save(kind, &records).await?;
        debug!("Updated the notes of {kind} transaction {id}");
        Ok(updated)
    }

    /// Appends a sub-expense to the first received transaction with `received_id`. The expense is
    /// refused with `LedgerError::Overflow` if the parent's balance could no longer be computed.
    pub async fn append_sub_expense(
        &self,
        received_id: &str,
        draft: SubExpenseDraft,
    ) -> Result<SubExpense> {
        let expense = draft.validate()?;
        let kind = TransactionKind::Received;
        let mut records = self.load(kind).await?;
        let parent = records
            .iter_mut()
            .find_map(|t| match t {
                Transaction::Received(r) if r.id == received_id => Some(r),
                _ => None,
            })
            .ok_or_else(|| LedgerError::not_found(kind, received_id))?;
        parent.expenses.push(expense.clone());
        compute_balance(parent)?;
        self.save(kind, &records).await?;
        debug!(
            "Added sub-expense {} to received transaction {received_id}",
            expense.id()
        );
        Ok(expense)
    }

    /// Removes every record of `kind` with `id` and returns how many were removed. Deleting an id
    /// that does not exist rewrites the collection unchanged and returns zero.
    pub async fn delete_by_id(&self, kind: TransactionKind, id: &str) -> Result<usize> {
        let mut records = self.load(kind).await?;
        let before = records.len();
        records.retain(|t| t.id() != id);
        let removed = before - records.len();
        self.save(kind, &records).await?;
        debug!("Deleted {removed} {kind} transaction(s) with id {id}");
        Ok(removed)
    }

    /// Removes both collections. The lock flag is left alone.
    pub async fn clear_all(&self) -> Result<()> {
        for kind in [TransactionKind::Received, TransactionKind::Spent] {
            let key = storage_key(kind);
            self.store
                .remove(key)
                .await
                .with_context(|| format!("Unable to delete the {kind} transactions"))?;
        }
        debug!("Removed all transaction data");
        Ok(())
    }

    /// True only when the stored flag is the literal text `true`.
    pub async fn lock_enabled(&self) -> Result<bool> {
        let value = self
            .store
            .get(APP_LOCK_KEY)
            .await
            .context("Unable to read the app lock setting")?;
        Ok(value.as_deref() == Some("true"))
    }

    pub async fn set_lock_enabled(&self, enabled: bool) -> Result<()> {
        self.store
            .set(APP_LOCK_KEY, if enabled { "true" } else { "false" })
            .await
            .context("Unable to save the app lock setting")?;
        debug!("Set the app lock flag to {enabled}");
        Ok(())
    }

    async fn append(&self, record: Transaction) -> Result<()> {
        let kind = record.kind();
        let mut records = self.load(kind).await?;
        let id = record.id().to_string();
        records.push(record);
        self.save(kind, &records).await?;
        debug!("Appended {kind} transaction {id}");
        Ok(())
    }

    /// Loads a collection. An absent, blank or `null` value is an empty collection.
    async fn load(&self, kind: TransactionKind) -> Result<Vec<Transaction>> {
        let key = storage_key(kind);
        let text = self
            .store
            .get(key)
            .await
            .with_context(|| format!("Unable to load the {kind} transactions"))?;
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Ok(Vec::new()),
        };
        let records: Vec<Transaction> = match serde_json::from_str::<Option<Vec<Transaction>>>(&text)
        {
            Ok(records) => records.unwrap_or_default(),
            Err(source) => {
                warn!("The value stored under '{key}' cannot be parsed: {source}");
                return Err(LedgerError::CorruptData {
                    key: key.to_string(),
                    source,
                }
                .into());
            }
        };
        if let Some(other) = records.iter().find(|t| t.kind() != kind) {
            warn!(
                "The value stored under '{key}' contains {} transaction {}",
                other.kind(),
                other.id()
            );
            return Err(LedgerError::MixedCollection {
                key: key.to_string(),
                found: other.kind(),
            }
            .into());
        }
        Ok(records)
    }

    async fn save(&self, kind: TransactionKind, records: &[Transaction]) -> Result<()> {
        let key = storage_key(kind);
        let text = serde_json::to_string(records)
            .with_context(|| format!("Unable to serialize the {kind} transactions"))?;
        self.store
            .set(key, &text)
            .await
            .with_context(|| format!("Unable to save the {kind} transactions"))?;
        debug!("Wrote {} {kind} transaction(s) to '{key}'", records.len());
        Ok(())
    }
}
