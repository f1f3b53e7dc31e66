//! CLI module — Clap argument parser, output helpers, and command implementations.
//!
//! Commands only consume the public vault and session API; nothing in
//! here decides how secrets are stored.

pub mod clipboard;
pub mod commands;
pub mod output;
pub mod password;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{resolve_home, Settings, VaultPaths};
use crate::errors::{LockboxError, Result};
use crate::session::SessionManager;
use crate::vault::Vault;

/// Minimum master password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable holding the master password for scripted use.
pub const PASSWORD_ENV: &str = "LOCKBOX_PASSWORD";

/// Lockbox CLI: encrypted credential and alias store.
#[derive(Parser)]
#[command(
    name = "lockbox",
    about = "Encrypted credential and alias store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Lockbox home directory (default: ~/.lockbox)
    #[arg(long, global = true, env = "LOCKBOX_HOME")]
    pub home: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault and unlock it
    Init {
        /// Overwrite an existing vault
        #[arg(short, long)]
        force: bool,
    },

    /// Unlock the vault and start a session
    Unlock,

    /// Lock the vault and end the session
    Lock,

    /// Manage stored credentials
    Creds {
        #[command(subcommand)]
        action: CredsAction,
    },

    /// Manage stored command aliases
    Alias {
        #[command(subcommand)]
        action: AliasAction,
    },

    /// Generate a random password and copy it to the clipboard
    Generate {
        /// Password length (default from config, 15)
        #[arg(short, long)]
        length: Option<usize>,
        /// Include punctuation
        #[arg(short, long)]
        symbols: bool,
        /// Include digits
        #[arg(short, long)]
        numbers: bool,
        /// Print the password instead of only copying it
        #[arg(short = 'S', long)]
        show: bool,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// `lockbox creds` subcommands.
#[derive(clap::Subcommand)]
pub enum CredsAction {
    /// Add a credential
    Add {
        /// Credential name
        name: String,
        /// Username or email (prompted if omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (prompted if omitted; may appear in shell history)
        #[arg(short, long)]
        password: Option<String>,
        /// Generate a secure password
        #[arg(short, long, conflicts_with = "password")]
        autogenerate: bool,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// Show a credential (password goes to the clipboard by default)
    Get {
        /// Credential name
        name: String,
        /// Print the password instead of copying it
        #[arg(short, long)]
        password: bool,
        /// Print the full record as JSON
        #[arg(short, long)]
        details: bool,
    },

    /// List all credentials
    List,

    /// Delete a credential
    Delete {
        /// Credential name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change fields of a credential
    Update {
        /// Current credential name
        name: String,
        /// Rename the credential
        #[arg(long)]
        new_name: Option<String>,
        /// New username
        #[arg(short, long)]
        username: Option<String>,
        /// New password
        #[arg(short, long)]
        password: Option<String>,
        /// Generate a new secure password
        #[arg(short, long, conflicts_with = "password")]
        autogenerate: bool,
        /// New notes ("" clears them)
        #[arg(short, long)]
        notes: Option<String>,
        /// New comma-separated tags ("" clears them)
        #[arg(short, long)]
        tags: Option<String>,
    },
}

/// `lockbox alias` subcommands.
#[derive(clap::Subcommand)]
pub enum AliasAction {
    /// Add an alias
    Add {
        /// Alias name
        name: String,
        /// Shell command (prompted if omitted)
        #[arg(short, long)]
        command: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// Show an alias (command goes to the clipboard by default)
    Get {
        /// Alias name
        name: String,
        /// Print the command instead of copying it
        #[arg(short, long)]
        show: bool,
        /// Print the full record as JSON
        #[arg(short, long)]
        details: bool,
    },

    /// List all aliases
    List,

    /// Delete an alias
    Delete {
        /// Alias name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change fields of an alias
    Update {
        /// Current alias name
        name: String,
        /// Rename the alias
        #[arg(long)]
        new_name: Option<String>,
        /// New command
        #[arg(short, long)]
        command: Option<String>,
        /// New notes ("" clears them)
        #[arg(short, long)]
        notes: Option<String>,
        /// New comma-separated tags ("" clears them)
        #[arg(short, long)]
        tags: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved home, settings and paths for one invocation.
pub struct Context {
    pub home: PathBuf,
    pub settings: Settings,
    pub paths: VaultPaths,
}

impl Context {
    /// Resolve the home directory and load `config.toml` from it.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let home = resolve_home(cli.home.as_deref())?;
        let settings = Settings::load(&home)?;
        let paths = settings.paths(&home);
        tracing::debug!(home = %home.display(), vault = %paths.vault_file.display(), "resolved paths");
        Ok(Self {
            home,
            settings,
            paths,
        })
    }

    /// A fresh, not yet loaded vault handle.
    pub fn vault(&self) -> Vault {
        Vault::new(self.paths.clone())
    }

    pub fn sessions(&self) -> SessionManager {
        SessionManager::from_settings(&self.settings, &self.paths)
    }

    /// Check the session and load the vault with its cached key.
    pub fn open_vault(&self) -> Result<Vault> {
        self.sessions().require_active()?;
        let mut vault = self.vault();
        vault.load(true)?;
        Ok(vault)
    }
}

/// Get the master password from `LOCKBOX_PASSWORD` or an interactive prompt.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| LockboxError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used during `init`).
///
/// Also respects `LOCKBOX_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        if pw.len() < MIN_PASSWORD_LEN {
            return Err(LockboxError::CommandFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| LockboxError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Split a comma-separated tag list, dropping blanks.
///
/// `""` yields an empty list, which is how `update --tags ""` clears tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| LockboxError::CommandFailed(format!("confirm prompt: {e}")))
}
