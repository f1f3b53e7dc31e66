//! `lockbox init` — create a new vault and open a session on it.

use crate::cli::output;
use crate::cli::{confirm, prompt_new_password, Context};
use crate::errors::{LockboxError, Result};

/// Execute the `init` command.
pub fn execute(ctx: &Context, force: bool) -> Result<()> {
    let mut vault = ctx.vault();
    let replacing = vault.exists();

    // 1. Refuse to clobber an existing vault unless --force was given.
    if replacing {
        if !force {
            output::tip("Use `lockbox init --force` to replace it.");
            return Err(LockboxError::VaultAlreadyExists(ctx.paths.vault_file.clone()));
        }

        if std::env::var_os(crate::cli::PASSWORD_ENV).is_none()
            && !confirm("This permanently deletes every stored record. Continue?")?
        {
            return Err(LockboxError::UserCancelled);
        }
    }

    // 2. Choose the master password before anything on disk changes.
    let password = prompt_new_password()?;

    // 3. Seal the new envelope; an old one is swapped out only once this succeeds.
    if replacing {
        vault.replace(&password)?;
        output::info("Replaced existing vault.");
    } else {
        vault.create(&password)?;
    }
    output::success(&format!(
        "Vault created at {}",
        ctx.paths.vault_file.display()
    ));

    // 4. Unlock right away so the user can start adding records.
    vault.unlock(&password)?;
    ctx.sessions().create_session()?;

    output::success("Vault unlocked.");
    output::tip("Run `lockbox creds add <NAME>` to store your first credential.");
    Ok(())
}
