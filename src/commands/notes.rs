use crate::args::NotesArgs;
use crate::commands::Out;
use crate::model::Transaction;
use crate::{Config, Result};

/// Replaces the notes of a transaction. An empty text clears them.
pub async fn notes(config: Config, args: NotesArgs) -> Result<Out<Transaction>> {
    let updated = config
        .repository()
        .update_notes(args.kind(), args.id(), args.text())
        .await?;
    Ok(Out::new(
        format!("Updated the notes of {} transaction {}", args.kind(), args.id()),
        updated,
    ))
}
