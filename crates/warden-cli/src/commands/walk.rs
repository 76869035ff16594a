//! Walk command implementation

use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;
use warden_core::{Metrics, Policy, PolicyWalker, WalkOptions, walk_filename, write_walk};
use warden_fs::NormalizedPath;

use crate::error::Result;
use crate::render::{self, VerbosePrinter};

/// Arguments of `warden walk`.
#[derive(Debug, Clone)]
pub struct WalkArgs {
    pub policy: PathBuf,
    pub output_prefix: Option<PathBuf>,
    pub max_hash_size: Option<u64>,
    pub workers: Option<usize>,
    pub verbose: bool,
}

/// Run the walk command
///
/// Returns the location the walk was written to, if any.
pub fn run_walk(args: &WalkArgs) -> Result<Option<PathBuf>> {
    let policy = Policy::load(&args.policy)?;
    let metrics = Metrics::new();
    let printer = VerbosePrinter::new(io::stdout());

    let mut walker = PolicyWalker::new(policy, &metrics).with_options(WalkOptions {
        workers: args.workers,
        max_hash_file_size: args.max_hash_size,
        ..WalkOptions::default()
    });
    if args.verbose {
        walker = walker.with_observer(&printer);
    }
    let walk = walker.run()?;

    let written = match &args.output_prefix {
        Some(prefix) => {
            let path = std::path::absolute(prefix)?
                .join(walk_filename(walk.hostname(), walk.start_walk()));
            let fingerprint = write_walk(&NormalizedPath::new(&path), &walk)?;
            println!(
                "{} {} ({})",
                "Walk written to".green(),
                path.display(),
                fingerprint
            );
            Some(path)
        }
        None => {
            println!(
                "{}",
                "No output prefix given, walk was not saved".yellow()
            );
            None
        }
    };

    let mut out = io::stdout().lock();
    writeln!(out)?;
    render::walk_summary(&mut out, &walk)?;
    if !walk.notifications().is_empty() {
        writeln!(out)?;
        render::notifications(&mut out, walk.notifications())?;
    }
    writeln!(out)?;
    render::metrics_table(&mut out, &metrics.snapshot())?;

    Ok(written)
}
