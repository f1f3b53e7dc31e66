//! `lockbox alias` — saved shell commands.

use crate::cli::output;
use crate::cli::{clipboard, confirm, parse_tags, AliasAction, Context};
use crate::errors::{LockboxError, Result};
use crate::vault::{Alias, AliasPatch};

/// Dispatch an `alias` subcommand.
pub fn execute(ctx: &Context, action: &AliasAction) -> Result<()> {
    match action {
        AliasAction::Add {
            name,
            command,
            notes,
            tags,
        } => add(
            ctx,
            name,
            command.as_deref(),
            notes.as_deref(),
            tags.as_deref(),
        ),
        AliasAction::Get {
            name,
            show,
            details,
        } => get(ctx, name, *show, *details),
        AliasAction::List => {
            let vault = ctx.open_vault()?;
            output::print_aliases_table(&vault.list_aliases()?);
            Ok(())
        }
        AliasAction::Delete { name, force } => delete(ctx, name, *force),
        AliasAction::Update {
            name,
            new_name,
            command,
            notes,
            tags,
        } => {
            let mut patch = AliasPatch::new(name.as_str());
            if let Some(new_name) = new_name {
                patch = patch.rename(new_name.as_str());
            }
            if let Some(command) = command {
                patch = patch.command(command.as_str());
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
    command: Option<&str>,
    notes: Option<&str>,
    tags: Option<&str>,
) -> Result<()> {
    let mut vault = ctx.open_vault()?;

    if vault.get_alias(name)?.is_some() {
        return Err(LockboxError::AliasAlreadyExists(name.to_string()));
    }

    let command = match command {
        Some(c) => c.to_string(),
        None => dialoguer::Input::<String>::new()
            .with_prompt("Command")
            .interact_text()
            .map_err(|e| LockboxError::CommandFailed(format!("command prompt: {e}")))?,
    };

    let mut alias = Alias::new(name, command);
    if let Some(notes) = notes {
        alias = alias.with_notes(notes);
    }
    if let Some(tags) = tags {
        alias = alias.with_tags(parse_tags(tags));
    }

    vault.add_alias(alias)?;
    output::success(&format!("Added alias '{name}'"));
    Ok(())
}

fn get(ctx: &Context, name: &str, show: bool, details: bool) -> Result<()> {
    let vault = ctx.open_vault()?;
    let alias = vault
        .get_alias(name)?
        .ok_or_else(|| LockboxError::AliasNotFound(name.to_string()))?;

    if details {
        let json = serde_json::to_string_pretty(alias)
            .map_err(|e| LockboxError::SerializationError(e.to_string()))?;
        println!("{json}");
    } else if show {
        println!("{}", alias.command);
    } else {
        clipboard::copy_or_warn(&alias.command, "Command");
    }
    Ok(())
}

fn delete(ctx: &Context, name: &str, force: bool) -> Result<()> {
    let mut vault = ctx.open_vault()?;

    if vault.get_alias(name)?.is_none() {
        return Err(LockboxError::AliasNotFound(name.to_string()));
    }

    if !force && !confirm(&format!("Delete alias '{name}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    vault.delete_alias(name)?;
    output::success(&format!("Deleted alias '{name}'"));
    Ok(())
}

fn update(ctx: &Context, patch: &AliasPatch) -> Result<()> {
    let mut vault = ctx.open_vault()?;

    // No flags: walk through each field with the current value as default.
    let prompted;
    let patch = if patch.is_empty() {
        let current = vault
            .get_alias(&patch.name)?
            .ok_or_else(|| LockboxError::AliasNotFound(patch.name.clone()))?;
        prompted = patch_from_answers(current, prompt_answers(current)?);
        if prompted.is_empty() {
            output::info("Nothing changed.");
            return Ok(());
        }
        &prompted
    } else {
        patch
    };

    vault.update_alias(patch)?;

    let label = patch.new_name.as_deref().unwrap_or(&patch.name);
    output::success(&format!("Updated alias '{label}'"));
    Ok(())
}

/// Raw answers from the interactive update prompts.
struct Answers {
    name: String,
    command: String,
    notes: String,
    tags: String,
}

fn prompt_answers(current: &Alias) -> Result<Answers> {
    let text = |prompt: &str, default: &str, allow_empty: bool| -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .allow_empty(allow_empty)
            .interact_text()
            .map_err(|e| LockboxError::CommandFailed(format!("update prompt: {e}")))
    };

    Ok(Answers {
        name: text("Name", &current.name, false)?,
        command: text("Command", &current.command, false)?,
        notes: text("Notes", &current.notes, true)?,
        tags: text("Tags (comma-separated)", &current.tags.join(","), true)?,
    })
}

/// Keep only the answers that differ from `current`.
fn patch_from_answers(current: &Alias, answers: Answers) -> AliasPatch {
    let mut patch = AliasPatch::new(current.name.as_str());

    let name = answers.name.trim();
    if !name.is_empty() && name != current.name {
        patch = patch.rename(name);
    }
    if answers.command != current.command {
        patch = patch.command(answers.command);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> Alias {
        Alias::new("deploy", "make deploy").with_tags(["ops"])
    }

    #[test]
    fn defaults_produce_an_empty_patch() {
        let answers = Answers {
            name: "deploy".into(),
            command: "make deploy".into(),
            notes: String::new(),
            tags: "ops".into(),
        };
        assert!(patch_from_answers(&current(), answers).is_empty());
    }

    #[test]
    fn changed_command_and_cleared_tags() {
        let answers = Answers {
            name: "deploy".into(),
            command: "make release".into(),
            notes: String::new(),
            tags: String::new(),
        };
        let patch = patch_from_answers(&current(), answers);

        assert_eq!(patch.command.as_deref(), Some("make release"));
        assert_eq!(patch.tags, Some(Vec::new()));
        assert!(patch.new_name.is_none());
        assert!(patch.notes.is_none());
    }
}
