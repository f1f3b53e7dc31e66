//! `lockbox creds` — add, show, list, delete and update credentials.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::password::{generate_password, PasswordOptions};
use crate::cli::{clipboard, confirm, parse_tags, Context, CredsAction};
use crate::errors::{LockboxError, Result};
use crate::vault::{Credential, CredentialPatch};

/// Dispatch a `creds` subcommand.
pub fn execute(ctx: &Context, action: &CredsAction) -> Result<()> {
    match action {
        CredsAction::Add {
            name,
            username,
            password,
            autogenerate,
            notes,
            tags,
        } => add(
            ctx,
            name,
            username.as_deref(),
            password.as_deref(),
            *autogenerate,
            notes.as_deref(),
            tags.as_deref(),
        ),
        CredsAction::Get {
            name,
            password,
            details,
        } => get(ctx, name, *password, *details),
        CredsAction::List => list(ctx),
        CredsAction::Delete { name, force } => delete(ctx, name, *force),
        CredsAction::Update {
            name,
            new_name,
            username,
            password,
            autogenerate,
            notes,
            tags,
        } => {
            let mut patch = CredentialPatch::new(name.as_str());
            if let Some(new_name) = new_name {
                patch = patch.rename(new_name.as_str());
            }
            if let Some(username) = username {
                patch = patch.username(username.as_str());
            }
            if let Some(password) = password {
                patch = patch.password(password.as_str());
            }
            if *autogenerate {
                let generated = autogenerated(ctx)?;
                patch = patch.password(generated.as_str());
            }
            if let Some(notes) = notes {
                patch = patch.notes(notes.as_str());
            }
            if let Some(tags) = tags {
                patch = patch.tags(parse_tags(tags));
            }
            update(ctx, &patch)
        }
    }
}

fn add(
    ctx: &Context,
    name: &str,
    username: Option<&str>,
    password: Option<&str>,
    autogenerate: bool,
    notes: Option<&str>,
    tags: Option<&str>,
) -> Result<()> {
    let mut vault = ctx.open_vault()?;

    // Fail fast before prompting for anything.
    if vault.get_credential(name)?.is_some() {
        return Err(LockboxError::CredentialAlreadyExists(name.to_string()));
    }

    let username = match username {
        Some(u) => u.to_string(),
        None => dialoguer::Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(|e| LockboxError::CommandFailed(format!("username prompt: {e}")))?,
    };

    let password: Zeroizing<String> = match (password, autogenerate) {
        (Some(p), _) => Zeroizing::new(p.to_string()),
        (None, true) => autogenerated(ctx)?,
        (None, false) => Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt(format!("Password for '{name}'"))
                .with_confirmation("Confirm password", "Passwords do not match, try again")
                .interact()
                .map_err(|e| LockboxError::CommandFailed(format!("password prompt: {e}")))?,
        ),
    };

    let mut credential = Credential::new(name, username, password.as_str());
    if let Some(notes) = notes {
        credential = credential.with_notes(notes);
    }
    if let Some(tags) = tags {
        credential = credential.with_tags(parse_tags(tags));
    }

    vault.add_credential(credential)?;
    output::success(&format!("Added credential '{name}'"));

    if autogenerate {
        clipboard::copy_or_warn(&password, "Generated password");
    }
    Ok(())
}

fn get(ctx: &Context, name: &str, show_password: bool, details: bool) -> Result<()> {
    let vault = ctx.open_vault()?;
    let credential = vault
        .get_credential(name)?
        .ok_or_else(|| LockboxError::CredentialNotFound(name.to_string()))?;

    if details {
        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| LockboxError::SerializationError(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    if show_password {
        println!("{}", credential.password);
        return Ok(());
    }

    output::info(&format!("Username: {}", credential.username));
    clipboard::copy_or_warn(&credential.password, "Password");
    Ok(())
}

fn list(ctx: &Context) -> Result<()> {
    let vault = ctx.open_vault()?;
    output::print_credentials_table(&vault.list_credentials()?);
    Ok(())
}

fn delete(ctx: &Context, name: &str, force: bool) -> Result<()> {
    let mut vault = ctx.open_vault()?;

    if vault.get_credential(name)?.is_none() {
        return Err(LockboxError::CredentialNotFound(name.to_string()));
    }

    if !force && !confirm(&format!("Delete credential '{name}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    vault.delete_credential(name)?;
    output::success(&format!("Deleted credential '{name}'"));
    Ok(())
}

fn update(ctx: &Context, patch: &CredentialPatch) -> Result<()> {
    let mut vault = ctx.open_vault()?;

    // No flags: walk through each field with the current value as default.
    let prompted;
    let patch = if patch.is_empty() {
        let current = vault
            .get_credential(&patch.name)?
            .ok_or_else(|| LockboxError::CredentialNotFound(patch.name.clone()))?;
        prompted = patch_from_answers(current, prompt_answers(current)?);
        if prompted.is_empty() {
            output::info("Nothing changed.");
            return Ok(());
        }
        &prompted
    } else {
        patch
    };

    vault.update_credential(patch)?;

    let label = patch.new_name.as_deref().unwrap_or(&patch.name);
    output::success(&format!("Updated credential '{label}'"));
    Ok(())
}

/// Raw answers from the interactive update prompts.
struct Answers {
    name: String,
    username: String,
    /// Empty means "keep the current password".
    password: Zeroizing<String>,
    notes: String,
    tags: String,
}

fn prompt_answers(current: &Credential) -> Result<Answers> {
    let text = |prompt: &str, default: &str| -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| LockboxError::CommandFailed(format!("update prompt: {e}")))
    };

    let name = text("Name", &current.name)?;
    let username = text("Username", &current.username)?;
    let password = dialoguer::Password::new()
        .with_prompt("Password (leave empty to keep)")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| LockboxError::CommandFailed(format!("update prompt: {e}")))?;
    let notes = text("Notes", &current.notes)?;
    let tags = text("Tags (comma-separated)", &current.tags.join(","))?;

    Ok(Answers {
        name,
        username,
        password: Zeroizing::new(password),
        notes,
        tags,
    })
}

/// Keep only the answers that differ from `current`.
fn patch_from_answers(current: &Credential, answers: Answers) -> CredentialPatch {
    let mut patch = CredentialPatch::new(current.name.as_str());

    let name = answers.name.trim();
    if !name.is_empty() && name != current.name {
        patch = patch.rename(name);
    }
    if answers.username != current.username {
        patch = patch.username(answers.username);
    }
    if !answers.password.is_empty() && *answers.password != current.password {
        patch = patch.password(answers.password.as_str());
    }
    if answers.notes != current.notes {
        patch = patch.notes(answers.notes);
    }
    let tags = parse_tags(&answers.tags);
    if tags != current.tags {
        patch = patch.tags(tags);
    }
    patch
}

fn autogenerated(ctx: &Context) -> Result<Zeroizing<String>> {
    generate_password(&PasswordOptions {
        length: ctx.settings.password_length,
        ..PasswordOptions::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> Credential {
        Credential::new("mail", "me", "old-pw")
            .with_notes("personal")
            .with_tags(["email"])
    }

    fn unchanged() -> Answers {
        Answers {
            name: "mail".into(),
            username: "me".into(),
            password: Zeroizing::new(String::new()),
            notes: "personal".into(),
            tags: "email".into(),
        }
    }

    #[test]
    fn accepting_every_default_changes_nothing() {
        assert!(patch_from_answers(&current(), unchanged()).is_empty());
    }

    #[test]
    fn only_edited_fields_land_in_the_patch() {
        let answers = Answers {
            username: "you".into(),
            tags: "email, work".into(),
            ..unchanged()
        };
        let patch = patch_from_answers(&current(), answers);

        assert_eq!(patch.username.as_deref(), Some("you"));
        assert_eq!(patch.tags, Some(vec!["email".to_string(), "work".to_string()]));
        assert!(patch.password.is_none());
        assert!(patch.notes.is_none());
        assert!(patch.new_name.is_none());
    }

    #[test]
    fn rename_password_and_cleared_notes() {
        let answers = Answers {
            name: " work-mail ".into(),
            password: Zeroizing::new("new-pw".into()),
            notes: String::new(),
            ..unchanged()
        };
        let patch = patch_from_answers(&current(), answers);

        assert_eq!(patch.name, "mail");
        assert_eq!(patch.new_name.as_deref(), Some("work-mail"));
        assert_eq!(patch.password.as_deref(), Some("new-pw"));
        assert_eq!(patch.notes.as_deref(), Some(""));
    }
}
