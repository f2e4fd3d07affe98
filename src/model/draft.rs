//! Unvalidated user input for new records.
//!
//! A draft becomes a record only through `validate`, which checks the input, assigns a fresh id,
//! and never touches storage.

use crate::error::LedgerError;
use crate::model::{Amount, ReceivedTransaction, SpentTransaction, SubExpense};
use chrono::{DateTime, SubsecRound, Utc};
use std::str::FromStr;
use uuid::Uuid;

/// Generates a new record id. Ids are random 128-bit UUIDs.
pub(crate) fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Input for a new received transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedDraft {
    pub account: String,
    /// The amount as typed by the user.
    pub amount: String,
    pub date: DateTime<Utc>,
    pub notes: String,
}

impl ReceivedDraft {
    pub fn new(account: impl Into<String>, amount: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            account: account.into(),
            amount: amount.into(),
            date,
            notes: String::new(),
        }
    }

    /// Checks the draft against the configured `accounts` and builds the record.
    pub fn validate(self, accounts: &[String]) -> Result<ReceivedTransaction, LedgerError> {
        let amount = parse_amount(&self.amount)?;
        let account = required(self.account, "account")?;
        if !accounts.iter().any(|a| *a == account) {
            return Err(LedgerError::validation(format!(
                "Unknown account '{account}'. Choose one of: {}",
                accounts.join(", ")
            )));
        }
        Ok(ReceivedTransaction {
            id: generate_id(),
            account,
            amount,
            date: stored_precision(self.date),
            notes: self.notes,
            expenses: Vec::new(),
        })
    }
}

/// Input for a new spent transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpentDraft {
    pub account: String,
    pub recipient: String,
    pub amount: String,
    pub date: DateTime<Utc>,
    pub notes: String,
}

impl SpentDraft {
    pub fn new(
        account: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            account: account.into(),
            recipient: recipient.into(),
            amount: amount.into(),
            date,
            notes: String::new(),
        }
    }

    pub fn validate(self) -> Result<SpentTransaction, LedgerError> {
        let amount = parse_amount(&self.amount)?;
        let account = required(self.account, "account")?;
        let recipient = required(self.recipient, "recipient")?;
        Ok(SpentTransaction {
            id: generate_id(),
            account,
            amount,
            recipient,
            date: stored_precision(self.date),
            notes: self.notes,
        })
    }
}

/// Input for a new sub-expense. The timestamp is taken at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubExpenseDraft {
    pub description: String,
    pub amount: String,
}

impl SubExpenseDraft {
    pub fn new(description: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
        }
    }

    pub fn validate(self) -> Result<SubExpense, LedgerError> {
        let amount = parse_amount(&self.amount)?;
        let description = required(self.description, "description")?;
        Ok(SubExpense {
            id: generate_id(),
            description,
            amount,
            date: stored_precision(Utc::now()),
        })
    }
}

/// Records keep milliseconds, the precision of stored timestamps, so a new record equals what is
/// read back.
fn stored_precision(date: DateTime<Utc>) -> DateTime<Utc> {
    date.trunc_subsecs(3)
}

fn parse_amount(text: &str) -> Result<Amount, LedgerError> {
    let amount = Amount::from_str(text).map_err(|_| {
        LedgerError::validation(format!("Please enter a valid amount, '{}' is not a number.", text.trim()))
    })?;
    if !amount.is_positive() {
        return Err(LedgerError::validation(format!(
            "Please enter a valid amount, it must be greater than zero (got {amount})."
        )));
    }
    Ok(amount)
}

/// Trims `value` and rejects it if nothing is left.
fn required(value: String, field: &str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(format!("The {field} is required.")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dated;
    use chrono::TimeZone;

    fn accounts() -> Vec<String> {
        vec!["Mahis account".to_string(), "Amma account".to_string()]
    }

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0).unwrap()
    }

    fn message(e: LedgerError) -> String {
        match e {
            LedgerError::Validation(m) => m,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_received_draft_builds_record() {
        let r = ReceivedDraft::new("Mahis account", "5000", when())
            .validate(&accounts())
            .unwrap();
        assert_eq!(r.account(), "Mahis account");
        assert_eq!(r.amount(), Amount::from_str("5000").unwrap());
        assert!(r.expenses().is_empty());
        assert_eq!(r.notes(), "");
        assert_eq!(Uuid::parse_str(r.id()).unwrap().get_version_num(), 4);
    }

    #[test]
    fn test_dates_are_truncated_to_milliseconds() {
        let precise = DateTime::parse_from_rfc3339("2025-05-04T12:00:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        let expected = Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(123);

        let r = ReceivedDraft::new("Mahis account", "1", precise)
            .validate(&accounts())
            .unwrap();
        assert_eq!(r.date(), expected);
        let s = SpentDraft::new("Checking", "Landlord", "1", precise)
            .validate()
            .unwrap();
        assert_eq!(s.date(), expected);
        let e = SubExpenseDraft::new("Groceries", "1").validate().unwrap();
        assert_eq!(e.date().timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_received_draft_rejects_unknown_account() {
        let e = ReceivedDraft::new("Savings", "10", when())
            .validate(&accounts())
            .unwrap_err();
        assert!(message(e).contains("Unknown account 'Savings'"));
    }

    #[test]
    fn test_amount_must_be_positive_number() {
        for bad in ["", "  ", "abc", "0", "-5", "0.00"] {
            let e = SpentDraft::new("Checking", "Landlord", bad, when())
                .validate()
                .unwrap_err();
            assert!(message(e).starts_with("Please enter a valid amount"), "{bad}");
        }
    }

    #[test]
    fn test_spent_draft_requires_text_fields() {
        let e = SpentDraft::new("Checking", "   ", "10", when())
            .validate()
            .unwrap_err();
        assert_eq!(message(e), "The recipient is required.");

        let e = SpentDraft::new("", "Landlord", "10", when())
            .validate()
            .unwrap_err();
        assert_eq!(message(e), "The account is required.");
    }

    #[test]
    fn test_sub_expense_draft() {
        let before = Utc::now();
        let e = SubExpenseDraft::new(" Groceries ", "2000").validate().unwrap();
        assert_eq!(e.description(), "Groceries");
        assert!(e.date >= before);

        let err = SubExpenseDraft::new("", "2000").validate().unwrap_err();
        assert_eq!(message(err), "The description is required.");
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }
}
