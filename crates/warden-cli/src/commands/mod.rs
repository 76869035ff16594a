//! Command implementations for warden-cli

pub mod report;
pub mod walk;

pub use report::{ReportArgs, run_report};
pub use walk::{WalkArgs, run_walk};
