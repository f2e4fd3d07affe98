//! These structs provide the CLI interface for the ledger CLI.

use crate::model::TransactionKind;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: A command-line tool for keeping track of money received and money spent.
///
/// Income goes in as "received" transactions, each filed under one of your accounts. Expenses
/// can be logged against a received transaction, which shows you how much of it is left, or as
/// standalone "spent" transactions. Everything is stored in local JSON files and can be exported
/// as CSV.
///
/// The app can be locked so that every command first asks the device to authenticate you.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the data directory is
    /// $HOME/pocket-ledger, pass --ledger-home if you want it somewhere else. The list of accounts
    /// that income can be filed under is kept in config.json and can be edited there.
    Init,
    /// Add, list and inspect money received.
    Received(ReceivedArgs),
    /// Add and list money spent.
    Spent(SpentArgs),
    /// Replace the notes of a transaction.
    Notes(NotesArgs),
    /// Delete a transaction. Deleting an id that does not exist is not an error.
    Delete(DeleteArgs),
    /// Write transactions to a CSV file in the exports directory.
    Export(ExportArgs),
    /// Show, enable or disable the app lock.
    Lock(LockArgs),
    /// Delete all received and spent transactions. A backup is saved first.
    Wipe(WipeArgs),
}

impl Command {
    /// Whether the app lock must be open before this command runs.
    pub fn requires_unlock(&self) -> bool {
        match self {
            Command::Init => false,
            Command::Lock(args) => args.action() != LockAction::Status,
            _ => true,
        }
    }
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where ledger data and configuration is held. Defaults to ~/pocket-ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// (Not shown): Args for the `ledger received` command.
#[derive(Debug, Parser, Clone)]
pub struct ReceivedArgs {
    #[command(subcommand)]
    command: ReceivedCommand,
}

impl ReceivedArgs {
    pub fn new(command: ReceivedCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ReceivedCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReceivedCommand {
    /// Record money received into one of your accounts.
    Add(ReceivedAddArgs),
    /// List received transactions, newest first, with what is left of each.
    List,
    /// Show one received transaction with its expenses, newest first.
    Show(IdArgs),
    /// Log an expense against a received transaction.
    Expense(ExpenseArgs),
}

/// (Not shown): Args for the `ledger received add` command.
#[derive(Debug, Parser, Clone)]
pub struct ReceivedAddArgs {
    /// The amount received, e.g. 5000 or 12.50
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// The account the money went into. Defaults to the first account in config.json
    #[arg(long)]
    account: Option<String>,

    /// When the money was received, as an RFC 3339 timestamp or YYYY-MM-DD. Defaults to now
    #[arg(long, value_parser = parse_when)]
    date: Option<DateTime<Utc>>,

    /// Free-text notes
    #[arg(long, default_value = "")]
    notes: String,
}

impl ReceivedAddArgs {
    pub fn new(
        amount: impl Into<String>,
        account: Option<String>,
        date: Option<DateTime<Utc>>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            account,
            date,
            notes: notes.into(),
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// (Not shown): Args for commands that take a single transaction id.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    /// The id of the transaction
    id: String,
}

impl IdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `ledger received expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    /// The id of the received transaction the expense is paid from
    id: String,

    /// What the money was spent on
    #[arg(long)]
    description: String,

    /// The amount spent
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
}

impl ExpenseArgs {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount: amount.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// (Not shown): Args for the `ledger spent` command.
#[derive(Debug, Parser, Clone)]
pub struct SpentArgs {
    #[command(subcommand)]
    command: SpentCommand,
}

impl SpentArgs {
    pub fn new(command: SpentCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &SpentCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SpentCommand {
    /// Record money spent.
    Add(SpentAddArgs),
    /// List spent transactions, newest first.
    List,
}

/// (Not shown): Args for the `ledger spent add` command.
#[derive(Debug, Parser, Clone)]
pub struct SpentAddArgs {
    /// The amount spent
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// The account the money came from
    #[arg(long)]
    account: String,

    /// Who the money went to
    #[arg(long)]
    recipient: String,

    /// When the money was spent, as an RFC 3339 timestamp or YYYY-MM-DD. Defaults to now
    #[arg(long, value_parser = parse_when)]
    date: Option<DateTime<Utc>>,

    /// Free-text notes
    #[arg(long, default_value = "")]
    notes: String,
}

impl SpentAddArgs {
    pub fn new(
        amount: impl Into<String>,
        account: impl Into<String>,
        recipient: impl Into<String>,
        date: Option<DateTime<Utc>>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            account: account.into(),
            recipient: recipient.into(),
            date,
            notes: notes.into(),
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// (Not shown): Args for the `ledger notes` command.
#[derive(Debug, Parser, Clone)]
pub struct NotesArgs {
    /// The collection the transaction is in: received or spent
    #[arg(value_enum)]
    kind: TransactionKind,

    /// The id of the transaction
    id: String,

    /// The new notes. An empty string clears them
    text: String,
}

impl NotesArgs {
    pub fn new(kind: TransactionKind, id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// (Not shown): Args for the `ledger delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The collection the transaction is in: received or spent
    #[arg(value_enum)]
    kind: TransactionKind,

    /// The id of the transaction
    id: String,
}

impl DeleteArgs {
    pub fn new(kind: TransactionKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `ledger export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[command(subcommand)]
    command: ExportCommand,
}

impl ExportArgs {
    pub fn new(command: ExportCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ExportCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExportCommand {
    /// Export received transactions, optionally for one account.
    Received(ExportReceivedArgs),
    /// Export spent transactions within a range of days.
    Spent(ExportSpentArgs),
}

/// (Not shown): Args for the `ledger export received` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportReceivedArgs {
    /// Only export this account. Defaults to all accounts
    #[arg(long)]
    account: Option<String>,
}

impl ExportReceivedArgs {
    pub fn new(account: Option<String>) -> Self {
        Self { account }
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }
}

/// (Not shown): Args for the `ledger export spent` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportSpentArgs {
    /// The first day to include, YYYY-MM-DD. Defaults to January 1st of this year
    #[arg(long)]
    from: Option<NaiveDate>,

    /// The last day to include, YYYY-MM-DD. Defaults to today
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl ExportSpentArgs {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockAction {
    #[default]
    Status,
    Enable,
    Disable,
}

serde_plain::derive_display_from_serialize!(LockAction);
serde_plain::derive_fromstr_from_deserialize!(LockAction);

/// (Not shown): Args for the `ledger lock` command.
#[derive(Debug, Parser, Clone)]
pub struct LockArgs {
    /// What to do: "status", "enable" or "disable"
    #[arg(default_value_t = LockAction::Status)]
    action: LockAction,
}

impl LockArgs {
    pub fn new(action: LockAction) -> Self {
        Self { action }
    }

    pub fn action(&self) -> LockAction {
        self.action
    }
}

/// (Not shown): Args for the `ledger wipe` command.
#[derive(Debug, Parser, Clone)]
pub struct WipeArgs {
    /// Confirm that all received and spent transactions should be deleted.
    #[arg(long)]
    yes: bool,
}

impl WipeArgs {
    pub fn new(yes: bool) -> Self {
        Self { yes }
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Parses an RFC 3339 timestamp, or a `YYYY-MM-DD` date taken as local midnight.
pub fn parse_when(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Ok(d.with_timezone(&Utc));
    }
    let day = NaiveDate::from_str(s)
        .map_err(|_| format!("'{s}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"))?;
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .ok_or_else(|| format!("'{s}' does not exist in the local time zone"))
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("pocket-ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("pocket-ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_received_add() {
        let args = parse(&[
            "ledger",
            "--ledger-home",
            "/tmp/x",
            "received",
            "add",
            "--amount",
            "5000",
            "--account",
            "Mahis account",
            "--date",
            "2025-03-01T10:00:00Z",
        ]);
        assert_eq!(args.common().ledger_home().path(), Path::new("/tmp/x"));
        let Command::Received(received) = args.command() else {
            panic!("expected received");
        };
        let ReceivedCommand::Add(add) = received.command() else {
            panic!("expected add");
        };
        assert_eq!(add.amount(), "5000");
        assert_eq!(add.account(), Some("Mahis account"));
        assert_eq!(add.notes(), "");
        assert_eq!(
            add.date().unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_notes_and_lock() {
        let args = parse(&["ledger", "notes", "spent", "abc", "Rent, March"]);
        let Command::Notes(notes) = args.command() else {
            panic!("expected notes");
        };
        assert_eq!(notes.kind(), TransactionKind::Spent);
        assert_eq!(notes.text(), "Rent, March");
        assert!(args.command().requires_unlock());

        let args = parse(&["ledger", "lock"]);
        assert!(!args.command().requires_unlock());
        let args = parse(&["ledger", "lock", "disable"]);
        assert!(args.command().requires_unlock());
        assert!(Args::try_parse_from(["ledger", "lock", "toggle"]).is_err());
        assert!(!parse(&["ledger", "init"]).command().requires_unlock());
    }

    #[test]
    fn test_parse_export_spent_dates() {
        let args = parse(&["ledger", "export", "spent", "--from", "2025-01-01"]);
        let Command::Export(export) = args.command() else {
            panic!("expected export");
        };
        let ExportCommand::Spent(spent) = export.command() else {
            panic!("expected spent");
        };
        assert_eq!(spent.from(), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(spent.to(), None);
    }

    #[test]
    fn test_parse_when() {
        assert_eq!(
            parse_when("2025-03-01T10:00:00.000+02:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
        );
        let local = parse_when("2025-03-01").unwrap().with_timezone(&Local);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(parse_when("yesterday").is_err());
    }
}
