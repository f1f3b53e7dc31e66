//! `lockbox completions <SHELL>` — print a completion script to stdout.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_script(shell, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Render the script for `shell` into `out`.
fn write_script(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin, out);
    Ok(())
}
