//! Text rendering of walks, comparisons and metrics
//!
//! Every function writes to an arbitrary [`Write`] sink so the same report
//! can go to stdout, a pager or a buffer.

use colored::Colorize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Mutex;
use warden_core::{
    ChangeKind, ChangeRecord, Comparison, File, LoadedWalk, Notification, Walk, WalkObserver,
};

/// Header describing a walk read from disk.
pub fn walk_header(out: &mut dyn Write, label: &str, loaded: Option<&LoadedWalk>) -> io::Result<()> {
    writeln!(out, "{}", format!("Walk ({label})").bold())?;
    let Some(loaded) = loaded else {
        writeln!(out, "  none: no reviewed baseline, every path is reported as added")?;
        return Ok(());
    };
    let walk = &loaded.walk;
    writeln!(out, "  {:<13}{}", "Reference:", loaded.reference)?;
    writeln!(out, "  {:<13}{}", "ID:", walk.id())?;
    writeln!(out, "  {:<13}{}", "Host:", walk.hostname())?;
    writeln!(out, "  {:<13}{}", "Started:", walk.start_walk())?;
    writeln!(out, "  {:<13}{}", "Stopped:", walk.stop_walk())?;
    writeln!(out, "  {:<13}{}", "Fingerprint:", loaded.fingerprint)?;
    Ok(())
}

/// Summary of a freshly recorded walk.
pub fn walk_summary(out: &mut dyn Write, walk: &Walk) -> io::Result<()> {
    writeln!(out, "{}", "Walk".bold())?;
    writeln!(out, "  {:<15}{}", "ID:", walk.id())?;
    writeln!(out, "  {:<15}{}", "Host:", walk.hostname())?;
    writeln!(out, "  {:<15}{}", "Started:", walk.start_walk())?;
    writeln!(out, "  {:<15}{}", "Stopped:", walk.stop_walk())?;
    writeln!(out, "  {:<15}{}", "Files:", walk.files().len())?;
    writeln!(out, "  {:<15}{}", "Notifications:", walk.notifications().len())?;
    Ok(())
}

/// One line per notification. Nothing is written for an empty list.
pub fn notifications(out: &mut dyn Write, notifications: &[Notification]) -> io::Result<()> {
    if notifications.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", "Notifications".bold())?;
    for n in notifications {
        let severity = match n.severity {
            warden_core::Severity::Info => n.severity.to_string().normal(),
            warden_core::Severity::Warning => n.severity.to_string().yellow(),
            warden_core::Severity::Error => n.severity.to_string().red(),
        };
        if n.path.as_str().is_empty() {
            writeln!(out, "  {} {}", severity, n.message)?;
        } else {
            writeln!(out, "  {} {}: {}", severity, n.path, n.message)?;
        }
    }
    Ok(())
}

/// Count of paths per change kind.
pub fn report_summary(out: &mut dyn Write, comparison: &Comparison<'_>) -> io::Result<()> {
    writeln!(out, "{}", "Report summary".bold())?;
    for (kind, count) in comparison.summary() {
        writeln!(out, "  {:<20}{:>6}", kind.label(), count)?;
    }
    Ok(())
}

/// Changed paths grouped by kind, in path order.
pub fn rule_summary(out: &mut dyn Write, comparison: &Comparison<'_>) -> io::Result<()> {
    writeln!(out, "{}", "Rule summary".bold())?;
    for (kind, paths) in comparison.rule_summary() {
        writeln!(out, "  {} ({})", kind.label(), paths.len())?;
        for path in paths {
            writeln!(out, "    {} {}", marker(kind), path)?;
        }
    }
    Ok(())
}

/// Field-level detail of every changed path.
pub fn details(out: &mut dyn Write, comparison: &Comparison<'_>) -> io::Result<()> {
    writeln!(out, "{}", "Details".bold())?;
    for record in comparison.changes() {
        writeln!(out, "  {} ({})", record.path, record.kind.label())?;
        if let Some((before, after)) = fingerprint_change(record) {
            writeln!(out, "    fingerprint: {} => {}", before, after)?;
        }
        for diff in &record.diffs {
            writeln!(out, "    {}", diff)?;
        }
    }
    Ok(())
}

/// Counter table, one `[name] = value` line per counter.
pub fn metrics_table(out: &mut dyn Write, counters: &BTreeMap<String, u64>) -> io::Result<()> {
    writeln!(out, "{}", "Metrics".bold())?;
    for (name, value) in counters {
        writeln!(out, "[{:<30}] = {:>6}", name, value)?;
    }
    Ok(())
}

/// The full report of a comparison.
pub fn report(
    out: &mut dyn Write,
    before: Option<&LoadedWalk>,
    after: &LoadedWalk,
    comparison: &Comparison<'_>,
    verbose: bool,
) -> io::Result<()> {
    walk_header(out, "before", before)?;
    writeln!(out)?;
    walk_header(out, "after", Some(after))?;
    writeln!(out)?;
    notifications(out, comparison.notifications())?;
    if !comparison.notifications().is_empty() {
        writeln!(out)?;
    }
    report_summary(out, comparison)?;
    writeln!(out)?;
    rule_summary(out, comparison)?;
    if verbose && comparison.has_changes() {
        writeln!(out)?;
        details(out, comparison)?;
    }
    out.flush()
}

/// A one-line description of a walked file.
pub fn file_line(file: &File) -> String {
    let mut line = format!(
        "{:>6o} {:>10} {} {}",
        file.stat.mode, file.info.size, file.info.modified, file.path
    );
    if let Some(fp) = &file.fingerprint {
        line.push(' ');
        line.push_str(&fp.to_string());
    }
    line
}

fn marker(kind: ChangeKind) -> colored::ColoredString {
    match kind {
        ChangeKind::Added => "+".green(),
        ChangeKind::Removed => "-".red(),
        ChangeKind::ContentChanged => "~".yellow(),
        ChangeKind::MetadataChanged => "*".cyan(),
        ChangeKind::Indeterminate => "?".magenta(),
        ChangeKind::Unchanged => "=".normal(),
    }
}

fn fingerprint_change(record: &ChangeRecord<'_>) -> Option<(String, String)> {
    let (before, after) = (record.before?, record.after?);
    if before.fingerprint == after.fingerprint {
        return None;
    }
    let show = |f: &File| {
        f.fingerprint
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string)
    };
    Some((show(before), show(after)))
}

/// Prints every file as the walker records it.
pub struct VerbosePrinter<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> VerbosePrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> WalkObserver for VerbosePrinter<W> {
    fn on_file(&self, file: &File) {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", file_line(file)) {
            tracing::warn!(error = %e, "Unable to print walked file");
        }
    }
}
