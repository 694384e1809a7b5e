//! Scone CLI - manifest-driven markdown documentation viewer.
//!
//! Provides commands for:
//! - `view`: Run the viewer against an origin and write the page to a file
//! - `check`: Validate the manifest and report missing documents

mod commands;
mod error;
mod fetcher;
mod output;
mod page;
mod storage;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ViewArgs};
use output::Output;

/// Scone - markdown documentation viewer.
#[derive(Parser)]
#[command(name = "scone", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the viewer.
    View(ViewArgs),
    /// Validate the manifest and the documents it references.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::View(args) => args.verbose,
        Commands::Check(args) => args.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    let result = match cli.command {
        Commands::View(args) => rt.block_on(args.execute()),
        Commands::Check(args) => rt.block_on(args.execute()),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
