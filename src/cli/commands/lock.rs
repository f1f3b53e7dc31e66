//! `lockbox lock` — forget the cached key and end the session.

use crate::cli::output;
use crate::cli::Context;
use crate::errors::Result;

/// Execute the `lock` command.
///
/// Works whether or not a vault or session currently exists.
pub fn execute(ctx: &Context) -> Result<()> {
    let mut vault = ctx.vault();
    vault.lock()?;
    ctx.sessions().end_session()?;

    output::success("Vault locked.");
    Ok(())
}
