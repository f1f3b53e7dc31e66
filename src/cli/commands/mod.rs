//! One module per subcommand.  Each exposes an `execute` entry point.

pub mod alias;
pub mod completions;
pub mod creds;
pub mod generate;
pub mod init;
pub mod lock;
pub mod unlock;
pub mod version;
