//! `lockbox unlock` — verify the master password and start a session.

use crate::cli::output;
use crate::cli::{prompt_password, Context};
use crate::errors::Result;

/// Execute the `unlock` command.
pub fn execute(ctx: &Context) -> Result<()> {
    let mut vault = ctx.vault();
    vault.load(false)?;

    let password = prompt_password()?;
    vault.unlock(&password)?;

    let sessions = ctx.sessions();
    sessions.create_session()?;

    output::success("Vault unlocked.");
    output::info(&format!(
        "Session expires in {} minutes.",
        sessions.lifespan().num_minutes()
    ));
    Ok(())
}
