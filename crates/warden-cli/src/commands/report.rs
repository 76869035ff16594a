//! Report command implementation

use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;
use warden_core::{
    Comparer, Metrics, Promotion, ReportConfig, ReviewStore, WalkRequest, resolve_walks,
};

use crate::error::Result;
use crate::interactive::ConsoleApproval;
use crate::output::Sink;
use crate::render;

/// Arguments of `warden report`.
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub config: PathBuf,
    pub review_file: Option<PathBuf>,
    pub hostname: Option<String>,
    pub walk_path: Option<PathBuf>,
    pub before: Option<PathBuf>,
    pub after: Option<PathBuf>,
    pub paginate: bool,
    pub no_promote: bool,
    pub verbose: bool,
}

/// Run the report command
///
/// Prints the comparison, then offers to promote the after walk to the
/// host's baseline when a reviews file is given.
pub fn run_report(args: &ReportArgs) -> Result<()> {
    let config = ReportConfig::load(&args.config)?;
    let resolved = resolve_walks(&WalkRequest {
        hostname: args.hostname.clone(),
        review_file: args.review_file.clone(),
        walk_dir: args.walk_path.clone(),
        before_file: args.before.clone(),
        after_file: args.after.clone(),
    })?;

    let metrics = Metrics::new();
    let comparison = Comparer::new(&config, &metrics).compare(
        resolved.before.as_ref().map(|b| &b.walk),
        &resolved.after.walk,
    );

    let mut sink = Sink::open(args.paginate)?;
    render::report(
        &mut sink,
        resolved.before.as_ref(),
        &resolved.after,
        &comparison,
        args.verbose,
    )?;
    sink.finish()?;

    match &args.review_file {
        Some(_) if args.no_promote => {
            tracing::debug!("Promotion disabled");
        }
        Some(_)
            if resolved
                .before
                .as_ref()
                .is_some_and(|b| b.walk.id() == resolved.after.walk.id()) =>
        {
            println!();
            println!("{}", "The after walk already is the baseline".dimmed());
        }
        Some(review_file) => {
            let store = ReviewStore::new(review_file);
            match store.promote(&resolved.hostname, &resolved.after, &ConsoleApproval)? {
                Promotion::Promoted(review) => println!(
                    "{} baseline of {} is now walk {}",
                    "Updated".green().bold(),
                    resolved.hostname,
                    review.walk_id
                ),
                Promotion::Declined => println!("{}", "Baseline not updated".yellow()),
            }
        }
        None => {}
    }

    let mut out = io::stdout().lock();
    writeln!(out)?;
    render::metrics_table(&mut out, &metrics.snapshot())?;
    Ok(())
}
