pub mod payment_intents;
pub mod subscriptions;

use anyhow::{Result, bail};

/// Guard for single-row updates inside a unit of work. Anything other than
/// exactly one affected row aborts the surrounding transaction.
pub(crate) fn exactly_one_row(affected: usize, table: &str) -> Result<()> {
    if affected == 1 {
        return Ok(());
    }
    bail!("expected exactly one {table} row to be updated, got {affected}");
}
