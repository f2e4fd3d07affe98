//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::{plural, Out};
use crate::{Config, Result};

/// Deletes every transaction with the given id from one collection. Deleting an id that does not
/// exist succeeds and reports zero deletions.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<usize>> {
    let count = config
        .repository()
        .delete_by_id(args.kind(), args.id())
        .await?;
    let message = format!(
        "Deleted {} {} transaction{}",
        count,
        args.kind(),
        plural(count)
    );
    Ok(Out::new(message, count))
}
