//! `lockbox version` — display version information.

use console::style;

use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("lockbox {current}");
    println!(
        "{}",
        style("PBKDF2-HMAC-SHA256 / AES-256-GCM").dim()
    );
    Ok(())
}
