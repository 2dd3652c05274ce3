use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// depresolve - resolve a universe of versioned components against a set of
/// requested roots
#[derive(Parser)]
#[command(name = "depresolve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a universe of components described in a JSON file
    Resolve {
        /// Path to a JSON document with `components`, `roots`, and an
        /// optional `matcher`
        universe_file: PathBuf,

        /// Print the error's full derivation context on failure
        #[arg(long)]
        verbose_conflicts: bool,

        /// Resolution timeout in seconds (0 = no timeout)
        #[arg(long)]
        resolve_timeout: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve {
            universe_file,
            verbose_conflicts,
            resolve_timeout,
        } => commands::resolve::run(&universe_file, verbose_conflicts, resolve_timeout),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
