use crate::model::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the two collections a transaction belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Income.
    Received,
    /// Expense.
    Spent,
}

serde_plain::derive_display_from_serialize!(TransactionKind);
serde_plain::derive_fromstr_from_deserialize!(TransactionKind);

/// Anything with a timestamp that list views sort by.
pub trait Dated {
    fn date(&self) -> DateTime<Utc>;
}

/// A transaction of either kind, tagged in JSON by a `"type"` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transaction {
    Received(ReceivedTransaction),
    Spent(SpentTransaction),
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Received(_) => TransactionKind::Received,
            Transaction::Spent(_) => TransactionKind::Spent,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Transaction::Received(r) => &r.id,
            Transaction::Spent(s) => &s.id,
        }
    }

    pub fn amount(&self) -> Amount {
        match self {
            Transaction::Received(r) => r.amount,
            Transaction::Spent(s) => s.amount,
        }
    }

    pub fn notes(&self) -> &str {
        match self {
            Transaction::Received(r) => &r.notes,
            Transaction::Spent(s) => &s.notes,
        }
    }

    pub(crate) fn set_notes(&mut self, notes: String) {
        match self {
            Transaction::Received(r) => r.notes = notes,
            Transaction::Spent(s) => s.notes = notes,
        }
    }
}

impl Dated for Transaction {
    fn date(&self) -> DateTime<Utc> {
        match self {
            Transaction::Received(r) => r.date,
            Transaction::Spent(s) => s.date,
        }
    }
}

impl From<ReceivedTransaction> for Transaction {
    fn from(value: ReceivedTransaction) -> Self {
        Transaction::Received(value)
    }
}

impl From<SpentTransaction> for Transaction {
    fn from(value: SpentTransaction) -> Self {
        Transaction::Spent(value)
    }
}

/// An income record. Its balance is derived from `expenses` and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedTransaction {
    pub(crate) id: String,
    /// One of the configured account names.
    pub(crate) account: String,
    pub(crate) amount: Amount,
    #[serde(with = "iso8601")]
    pub(crate) date: DateTime<Utc>,
    #[serde(default)]
    pub(crate) notes: String,
    /// Sub-expenses in insertion order.
    #[serde(default)]
    pub(crate) expenses: Vec<SubExpense>,
}

impl ReceivedTransaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn expenses(&self) -> &[SubExpense] {
        &self.expenses
    }
}

impl Dated for ReceivedTransaction {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// A standalone expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpentTransaction {
    pub(crate) id: String,
    /// Free-text source account.
    pub(crate) account: String,
    pub(crate) amount: Amount,
    pub(crate) recipient: String,
    #[serde(with = "iso8601")]
    pub(crate) date: DateTime<Utc>,
    #[serde(default)]
    pub(crate) notes: String,
}

impl SpentTransaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

impl Dated for SpentTransaction {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// An expense attributed against one received transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubExpense {
    pub(crate) id: String,
    pub(crate) description: String,
    pub(crate) amount: Amount,
    #[serde(with = "iso8601")]
    pub(crate) date: DateTime<Utc>,
}

impl SubExpense {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

impl Dated for SubExpense {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// Timestamps are written as `2025-03-01T10:00:00.000Z` and read from any RFC 3339 string.
pub(crate) mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|d| d.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
