//! Types that represent the core data model, such as `Transaction` and `SubExpense`.
mod amount;
mod draft;
mod transaction;

pub use amount::{Amount, AmountError};
pub use draft::{ReceivedDraft, SpentDraft, SubExpenseDraft};
pub use transaction::{
    Dated, ReceivedTransaction, SpentTransaction, SubExpense, Transaction, TransactionKind,
};

pub(crate) use transaction::iso8601;
