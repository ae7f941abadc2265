//! Murmur CLI - Layered Audio Synthesis
//!
//! Command-line interface for the babble and subliminal generators.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use murmur::cli::{commands, Cli, Commands};
use murmur::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Murmur v{}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  - {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Babble(args) => {
            let path = commands::babble(&args, config.babble)?;
            println!("Done! Wrote {}", path.display());
        }
        Commands::Subliminal(args) => {
            let path = commands::subliminal(&args, config.subliminal)?;
            println!("Subliminal audio created successfully: {}", path.display());
        }
    }
    Ok(())
}
