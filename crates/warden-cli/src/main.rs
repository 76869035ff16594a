//! Warden CLI
//!
//! Records policy-driven walks of the file system and reports how a walk
//! differs from the host's reviewed baseline.

mod cli;
mod commands;
mod error;
mod interactive;
mod logging;
mod output;
mod render;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::{ReportArgs, WalkArgs};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Walk {
            policy,
            output_prefix,
            max_hash_size,
            workers,
        } => commands::run_walk(&WalkArgs {
            policy,
            output_prefix,
            max_hash_size,
            workers,
            verbose: cli.verbose,
        })
        .map(|_| ()),
        Commands::Report {
            config,
            review_file,
            hostname,
            walk_path,
            before,
            after,
            paginate,
            no_promote,
        } => commands::run_report(&ReportArgs {
            config,
            review_file,
            hostname,
            walk_path,
            before,
            after,
            paginate,
            no_promote,
            verbose: cli.verbose,
        }),
    }
}
