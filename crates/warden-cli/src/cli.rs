//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Warden - record file system walks and review what changed
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print every walked file or per-file report detail, and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Walk the file system as a policy describes
    ///
    /// Examples:
    ///   warden walk --policy policy.toml
    ///   warden walk --policy policy.toml --output-prefix /var/lib/warden/walks
    Walk {
        /// Policy file (.toml, .json or .yaml)
        #[arg(long)]
        policy: PathBuf,

        /// Directory the walk is written to as <host>-<time>-walk.json
        #[arg(long)]
        output_prefix: Option<PathBuf>,

        /// Largest file, in bytes, that is hashed; overrides the policy
        #[arg(long)]
        max_hash_size: Option<u64>,

        /// Number of traversal threads
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Compare a walk against the reviewed baseline
    ///
    /// Examples:
    ///   warden report --config report.toml --review-file reviews.json --walk-path walks/
    ///   warden report --config report.toml --before old-walk.json --after new-walk.json
    Report {
        /// Report configuration file
        #[arg(long)]
        config: PathBuf,

        /// Reviews file holding each host's baseline
        #[arg(long)]
        review_file: Option<PathBuf>,

        /// Host to report on (defaults to the after walk's host, or this machine)
        #[arg(long)]
        hostname: Option<String>,

        /// Directory searched for the newest walk of the host
        #[arg(long)]
        walk_path: Option<PathBuf>,

        /// Explicit before walk; the reviews file is then not consulted
        #[arg(long)]
        before: Option<PathBuf>,

        /// Explicit after walk
        #[arg(long)]
        after: Option<PathBuf>,

        /// Send the report through $PAGER
        #[arg(long)]
        paginate: bool,

        /// Never offer to update the baseline
        #[arg(long)]
        no_promote: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_walk() {
        let cli = Cli::parse_from([
            "warden",
            "walk",
            "--policy",
            "p.toml",
            "--max-hash-size",
            "2048",
            "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Commands::Walk {
                policy: PathBuf::from("p.toml"),
                output_prefix: None,
                max_hash_size: Some(2048),
                workers: None,
            }
        );
    }

    #[test]
    fn parse_report() {
        let cli = Cli::parse_from([
            "warden",
            "report",
            "--config",
            "r.toml",
            "--before",
            "a.json",
            "--after",
            "b.json",
            "--no-promote",
        ]);
        let Commands::Report {
            before,
            after,
            no_promote,
            paginate,
            ..
        } = cli.command
        else {
            panic!("expected report");
        };
        assert_eq!(before, Some(PathBuf::from("a.json")));
        assert_eq!(after, Some(PathBuf::from("b.json")));
        assert!(no_promote);
        assert!(!paginate);
    }

    #[test]
    fn walk_requires_policy() {
        assert!(Cli::try_parse_from(["warden", "walk"]).is_err());
    }
}
