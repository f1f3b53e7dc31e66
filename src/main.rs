use clap::Parser;
use lockbox::cli::commands;
use lockbox::cli::{Cli, Commands, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter (default: warn).
const LOG_ENV: &str = "LOCKBOX_LOG";

fn main() {
    // Logs go to stderr so they never mix with secrets printed on stdout.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::debug!(error = ?e, "command failed");
        lockbox::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> lockbox::errors::Result<()> {
    // These never touch the vault, so they work without a home directory.
    match &cli.command {
        Commands::Version => return commands::version::execute(),
        Commands::Completions { shell } => return commands::completions::execute(*shell),
        _ => {}
    }

    let ctx = Context::from_cli(cli)?;

    match &cli.command {
        Commands::Init { force } => commands::init::execute(&ctx, *force),
        Commands::Unlock => commands::unlock::execute(&ctx),
        Commands::Lock => commands::lock::execute(&ctx),
        Commands::Creds { action } => commands::creds::execute(&ctx, action),
        Commands::Alias { action } => commands::alias::execute(&ctx, action),
        Commands::Generate {
            length,
            numbers,
            symbols,
            show,
        } => commands::generate::execute(&ctx, *length, *numbers, *symbols, *show),
        Commands::Version | Commands::Completions { .. } => Ok(()),
    }
}
