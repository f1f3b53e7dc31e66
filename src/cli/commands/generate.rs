//! `lockbox generate` — produce a random password.

use crate::cli::output;
use crate::cli::password::{generate_password, PasswordOptions};
use crate::cli::{clipboard, Context};
use crate::errors::Result;

/// Execute the `generate` command.
///
/// The password is copied to the clipboard; `--show` also prints it.
pub fn execute(
    ctx: &Context,
    length: Option<usize>,
    numbers: bool,
    symbols: bool,
    show: bool,
) -> Result<()> {
    let options = PasswordOptions {
        length: length.unwrap_or(ctx.settings.password_length),
        numbers,
        symbols,
    };
    let password = generate_password(&options)?;

    if show {
        output::info("Generated password:");
        println!("{}", password.as_str());
    }

    clipboard::copy_or_warn(&password, "Password");
    Ok(())
}
