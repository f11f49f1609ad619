//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration, then let flags win
    let config = crate::config::load(&cli)?;

    let ctx = commands::Context {
        config,
        output_format: cli.output,
    };

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(ctx, args).await,
        Commands::Check => commands::check::execute(ctx).await,
        Commands::Lookup(args) => commands::lookup::execute(ctx, args).await,
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
