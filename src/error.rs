//! Error types for the ledger.
//!
//! Plumbing failures (file I/O, config parsing) are `anyhow` errors with context. Failures that a
//! user needs to act on are raised as `LedgerError` values inside the same `anyhow::Error` so the
//! caller can tell them apart with `LedgerError::of`.

use crate::model::TransactionKind;
use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Bad user input, caught before anything is written.
    #[error("{0}")]
    Validation(String),

    /// A referenced record does not exist in its collection.
    #[error("The {kind} transaction '{id}' was not found. It may have been deleted.")]
    NotFound { kind: TransactionKind, id: String },

    /// Stored text under `key` is present but cannot be read back as a collection.
    #[error("The data stored under '{key}' is corrupt: {source}")]
    CorruptData {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored text under `key` contains a record of the wrong variant.
    #[error("The data stored under '{key}' contains a {found} transaction")]
    MixedCollection { key: String, found: TransactionKind },

    /// A sum of amounts in one received transaction is too large to represent.
    #[error("The amounts of received transaction '{id}' add up to more than can be represented.")]
    Overflow { id: String },

    /// An export filter matched nothing.
    #[error("There is no data matching your filters to export.")]
    NoData,

    /// The host device cannot provide authentication.
    #[error("{0}")]
    DeviceCapability(String),

    /// The app lock is enabled and authentication did not succeed.
    #[error("The app is locked. Authenticate to unlock it.")]
    Locked,
}

impl LedgerError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(kind: TransactionKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns the domain error carried by `e`, if there is one.
    pub fn of(e: &Error) -> Option<&LedgerError> {
        e.downcast_ref::<LedgerError>()
    }

    /// True for both kinds of unreadable stored collections.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            LedgerError::CorruptData { .. } | LedgerError::MixedCollection { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_of_finds_domain_error_under_context() {
        let e: Error = Err::<(), _>(LedgerError::NoData)
            .context("Export failed")
            .unwrap_err();
        assert!(matches!(LedgerError::of(&e), Some(LedgerError::NoData)));
    }

    #[test]
    fn test_of_returns_none_for_plumbing_errors() {
        let e = anyhow::anyhow!("disk on fire");
        assert!(LedgerError::of(&e).is_none());
    }

    #[test]
    fn test_not_found_message() {
        let e = LedgerError::not_found(TransactionKind::Spent, "abc");
        assert_eq!(
            e.to_string(),
            "The spent transaction 'abc' was not found. It may have been deleted."
        );
    }
}
