use clap::Parser;
use pocket_ledger::args::{
    Args, Command, ExportCommand, LockAction, ReceivedCommand, SpentCommand,
};
use pocket_ledger::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    // When LEDGER_IN_TEST_MODE is set and non-empty the app lock talks to a scripted
    // authenticator (see LEDGER_TEST_AUTH), otherwise it talks to the device.
    let mode = Mode::from_env();

    if let Command::Init = args.command() {
        commands::init(home).await?.print();
        return Ok(());
    }

    let config = Config::load(home).await?;
    if args.command().requires_unlock() {
        commands::unlock(&config, mode).await?;
    }

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => {}

        Command::Received(received_args) => match received_args.command() {
            ReceivedCommand::Add(args) => commands::received_add(config, args.clone())
                .await?
                .print(),
            ReceivedCommand::List => commands::received_list(config).await?.print(),
            ReceivedCommand::Show(args) => commands::received_show(config, args.clone())
                .await?
                .print(),
            ReceivedCommand::Expense(args) => commands::received_expense(config, args.clone())
                .await?
                .print(),
        },

        Command::Spent(spent_args) => match spent_args.command() {
            SpentCommand::Add(args) => commands::spent_add(config, args.clone()).await?.print(),
            SpentCommand::List => commands::spent_list(config).await?.print(),
        },

        Command::Notes(notes_args) => commands::notes(config, notes_args.clone()).await?.print(),

        Command::Delete(delete_args) => commands::delete(config, delete_args.clone())
            .await?
            .print(),

        Command::Export(export_args) => match export_args.command() {
            ExportCommand::Received(args) => commands::export_received(config, args.clone())
                .await?
                .print(),
            ExportCommand::Spent(args) => commands::export_spent(config, args.clone())
                .await?
                .print(),
        },

        Command::Lock(lock_args) => match lock_args.action() {
            LockAction::Status => commands::lock_status(config).await?.print(),
            LockAction::Enable => commands::lock_enable(config, mode).await?.print(),
            LockAction::Disable => commands::lock_disable(config).await?.print(),
        },

        Command::Wipe(wipe_args) => commands::wipe(config, wipe_args.clone()).await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
