//! CSV export of transaction lists.
//!
//! Filtering happens before formatting: callers narrow the list with `AccountFilter` or
//! `DateRange`, turn it into `Record`s, and hand those to `Exporter::export`.
//!
//! The CSV dialect is deliberately small. Every `"` in a value is doubled, and a value is quoted
//! only when it contains a comma. Newlines inside values are written as they are.

use crate::error::LedgerError;
use crate::model::{Dated, ReceivedTransaction};
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One CSV row: column name to value, in the order the columns were first seen.
pub type Record = Map<String, Value>;

/// Serializes each item into a flat `Record`, keeping its field order.
pub fn to_records<T: Serialize>(items: &[T]) -> Result<Vec<Record>> {
    items
        .iter()
        .map(|item| -> Result<Record> {
            match serde_json::to_value(item).context("Unable to serialize a row for export")? {
                Value::Object(map) => Ok(map),
                other => bail!("Only objects can be exported as CSV rows, got {other}"),
            }
        })
        .collect()
}

/// Formats `rows` as CSV text. Returns an empty string when there are no rows; otherwise the
/// output has a header line and one line per row, each ending in `\n`.
pub fn to_csv(rows: &[Record]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut headers: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut csv = join_line(headers.iter().map(|h| escape(h)));
    for row in rows {
        csv.push_str(&join_line(
            headers
                .iter()
                .map(|h| escape(&cell(row.get(*h)))),
        ));
    }
    csv
}

fn join_line(values: impl Iterator<Item = String>) -> String {
    let mut line = values.collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

/// The text of one cell before escaping.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape(value: &str) -> String {
    let doubled = value.replace('"', "\"\"");
    if doubled.contains(',') {
        format!("\"{doubled}\"")
    } else {
        doubled
    }
}

/// Which received transactions to export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccountFilter {
    #[default]
    All,
    Only(String),
}

impl AccountFilter {
    pub fn from_option(account: Option<String>) -> Self {
        account.map(AccountFilter::Only).unwrap_or_default()
    }

    pub fn matches(&self, transaction: &ReceivedTransaction) -> bool {
        match self {
            AccountFilter::All => true,
            AccountFilter::Only(name) => transaction.account() == name,
        }
    }

    pub fn apply(&self, transactions: Vec<ReceivedTransaction>) -> Vec<ReceivedTransaction> {
        transactions.into_iter().filter(|t| self.matches(t)).collect()
    }

    /// The export file name, e.g. `received_export_All.csv`. Path separators in an account name
    /// become `_` so the file stays in the exports directory.
    pub fn file_name(&self) -> String {
        let label: String = match self {
            AccountFilter::All => "All".to_string(),
            AccountFilter::Only(name) => name
                .chars()
                .map(|c| {
                    if std::path::is_separator(c) || c == '\\' || c == '\0' {
                        '_'
                    } else {
                        c
                    }
                })
                .collect(),
        };
        format!("received_export_{label}.csv")
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// The first and last instants of the range in `tz`: the start day at 00:00:00.000 and the
    /// end day at 23:59:59.999.
    pub fn bounds<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let first = self.start.and_time(NaiveTime::MIN);
        let last = self.end.and_time(end_of_day());
        (
            resolve(tz, &first, true),
            resolve(tz, &last, false),
        )
    }

    pub fn apply<T: Dated, Tz: TimeZone>(&self, items: Vec<T>, tz: &Tz) -> Vec<T> {
        let (first, last) = self.bounds(tz);
        items
            .into_iter()
            .filter(|t| first <= t.date() && t.date() <= last)
            .collect()
    }

    /// The export file name, e.g. `spent_export_2025-01-01_to_2025-03-31.csv`.
    pub fn file_name(&self) -> String {
        format!(
            "spent_export_{}_to_{}.csv",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Converts a wall-clock time in `tz` to UTC. Ambiguous times take the earliest instant for a
/// range start and the latest for a range end; times skipped by a DST change are read as UTC.
fn resolve<Tz: TimeZone>(tz: &Tz, local: &NaiveDateTime, earliest: bool) -> DateTime<Utc> {
    match tz.from_local_datetime(local) {
        LocalResult::Single(d) => d.with_timezone(&Utc),
        LocalResult::Ambiguous(a, b) => {
            if earliest {
                a.with_timezone(&Utc)
            } else {
                b.with_timezone(&Utc)
            }
        }
        LocalResult::None => Utc.from_utc_datetime(local),
    }
}

/// Writes CSV exports into one directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `rows` to `{dir}/{name}`, replacing any earlier file, and returns its path. Fails
    /// with `LedgerError::NoData` without writing anything when `rows` is empty.
    pub async fn export(&self, rows: &[Record], name: &str) -> Result<PathBuf> {
        if rows.is_empty() {
            return Err(LedgerError::NoData.into());
        }
        let path = self.dir.join(name);
        let csv = to_csv(rows);
        utils::write(&path, csv)
            .await
            .with_context(|| format!("Unable to export '{name}'"))?;
        debug!("Exported {} row(s) to {}", rows.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, SpentTransaction, SubExpense, Transaction};
    use chrono::FixedOffset;
    use serde_json::json;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn spent(id: &str, notes: &str, date: DateTime<Utc>) -> SpentTransaction {
        SpentTransaction {
            id: id.to_string(),
            account: "Checking".to_string(),
            amount: Amount::from_str("1200").unwrap(),
            recipient: "Landlord".to_string(),
            date,
            notes: notes.to_string(),
        }
    }

    fn received(id: &str, account: &str) -> ReceivedTransaction {
        ReceivedTransaction {
            id: id.to_string(),
            account: account.to_string(),
            amount: Amount::from_str("5000").unwrap(),
            date: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            notes: String::new(),
            expenses: vec![SubExpense {
                id: "e1".to_string(),
                description: "Groceries".to_string(),
                amount: Amount::from_str("2000").unwrap(),
                date: Utc.with_ymd_and_hms(2025, 3, 2, 9, 30, 0).unwrap(),
            }],
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_csv(&[]), "");
    }

    #[test]
    fn test_line_count() {
        let rows: Vec<Record> = (0..3).map(|i| record(json!({"n": i}))).collect();
        let csv = to_csv(&rows);
        assert_eq!(csv, "n\n0\n1\n2\n");
        assert_eq!(csv.lines().count(), rows.len() + 1);
    }

    #[test]
    fn test_comma_is_quoted() {
        let csv = to_csv(&[record(json!({"notes": "Rent, March"}))]);
        assert_eq!(csv, "notes\n\"Rent, March\"\n");
    }

    #[test]
    fn test_quotes_are_doubled_without_wrapping() {
        let csv = to_csv(&[record(json!({"notes": "the \"big\" one"}))]);
        assert_eq!(csv, "notes\nthe \"\"big\"\" one\n");

        let csv = to_csv(&[record(json!({"notes": "say \"hi\", then go"}))]);
        assert_eq!(csv, "notes\n\"say \"\"hi\"\", then go\"\n");
    }

    #[test]
    fn test_header_is_union_in_first_seen_order() {
        let rows = [
            record(json!({"b": 1, "a": "x"})),
            record(json!({"a": "y", "c": true})),
            record(json!({"d": null})),
        ];
        assert_eq!(to_csv(&rows), "b,a,c,d\n1,x,,\n,y,true,\n,,,\n");
    }

    #[test]
    fn test_received_rows_render_expenses_as_json() {
        let rows = to_records(&[Transaction::from(received("r1", "Mahis account"))]).unwrap();
        let text = to_csv(&rows);
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "type,id,account,amount,date,notes,expenses"
        );

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let parsed: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(parsed.len(), 1);
        assert_eq!(&parsed[0][0], "received");
        assert_eq!(&parsed[0][3], "5000");
        assert_eq!(&parsed[0][4], "2025-03-01T10:00:00.000Z");
        let expenses: Value = serde_json::from_str(&parsed[0][6]).unwrap();
        assert_eq!(expenses[0]["description"], "Groceries");
    }

    #[test]
    fn test_to_records_rejects_non_objects() {
        assert!(to_records(&[1, 2]).is_err());
    }

    #[test]
    fn test_account_filter() {
        let list = vec![
            received("a", "Mahis account"),
            received("b", "Amma account"),
            received("c", "Mahis account"),
        ];
        let only = AccountFilter::Only("Mahis account".to_string());
        let ids: Vec<String> = only
            .apply(list.clone())
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(AccountFilter::All.apply(list).len(), 3);
        assert_eq!(only.file_name(), "received_export_Mahis account.csv");
        assert_eq!(AccountFilter::from_option(None).file_name(), "received_export_All.csv");
        let sneaky = AccountFilter::from_option(Some("../../etc\\passwd".to_string()));
        assert_eq!(sneaky.file_name(), "received_export_.._.._etc_passwd.csv");
        assert_eq!(Path::new(&sneaky.file_name()).components().count(), 1);
    }

    #[test]
    fn test_date_range_is_inclusive_by_day() {
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        let local = |d: u32, h: u32, m: u32, s: u32, ms: u32| {
            NaiveDate::from_ymd_opt(2025, 3, d)
                .unwrap()
                .and_hms_milli_opt(h, m, s, ms)
                .unwrap()
                .and_local_timezone(tz)
                .unwrap()
                .with_timezone(&Utc)
        };
        let list = vec![
            spent("first", "", local(1, 0, 0, 0, 0)),
            spent("last", "", local(31, 23, 59, 59, 999)),
            spent("before", "", local(1, 0, 0, 0, 0) - chrono::Duration::milliseconds(1)),
            spent("after", "", local(31, 23, 59, 59, 999) + chrono::Duration::milliseconds(1)),
        ];
        let ids: Vec<String> = range
            .apply(list, &tz)
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, vec!["first", "last"]);
        assert_eq!(range.file_name(), "spent_export_2025-03-01_to_2025-03-31.csv");
    }

    #[tokio::test]
    async fn test_export_without_rows_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());
        let e = exporter.export(&[], "received_export_All.csv").await.unwrap_err();
        assert!(matches!(LedgerError::of(&e), Some(LedgerError::NoData)));
        assert!(!dir.path().join("received_export_All.csv").exists());
    }

    #[tokio::test]
    async fn test_export_writes_and_replaces() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());
        let when = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();
        let name = "spent_export_2025-01-01_to_2025-12-31.csv";

        let rows = to_records(&[Transaction::from(spent("s1", "Rent, March", when))]).unwrap();
        exporter.export(&rows, name).await.unwrap();
        let rows = to_records(&[Transaction::from(spent("s2", "", when))]).unwrap();
        let path = exporter.export(&rows, name).await.unwrap();

        let text = utils::read(&path).await.unwrap();
        assert_eq!(
            text,
            "type,id,account,amount,recipient,date,notes\n\
             spent,s2,Checking,1200,Landlord,2025-03-05T08:00:00.000Z,\n"
        );
    }
}
