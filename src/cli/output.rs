//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{Alias, Credential};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of credentials (Name, Username, Tags).  Passwords are never shown.
pub fn print_credentials_table(credentials: &[&Credential]) {
    if credentials.is_empty() {
        info("No credentials stored yet.");
        tip("Run `lockbox creds add <NAME>` to add your first credential.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Username", "Tags"]);

    for c in credentials {
        table.add_row(vec![
            c.name.clone(),
            c.username.clone(),
            c.tags.join(", "),
        ]);
    }

    println!("{table}");
}

/// Print a table of aliases (Name, Command, Tags).
pub fn print_aliases_table(aliases: &[&Alias]) {
    if aliases.is_empty() {
        info("No aliases stored yet.");
        tip("Run `lockbox alias add <NAME> -c <COMMAND>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Command", "Tags"]);

    for a in aliases {
        table.add_row(vec![a.name.clone(), a.command.clone(), a.tags.join(", ")]);
    }

    println!("{table}");
}
