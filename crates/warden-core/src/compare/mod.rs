//! Walk comparison
//!
//! The [`Comparer`] classifies every path of two walks into a [`ChangeKind`]
//! and returns a [`Comparison`] whose records are always in path order, no
//! matter how the work was scheduled.
//!
//! ```text
//!   before (optional) ──┐
//!                       ├─► index ─► exclude ─► classify (parallel) ─► Comparison
//!   after ──────────────┘
//! ```

mod diff;

pub use diff::{FieldDiff, metadata_diff};

use crate::Error;
use crate::config::ReportConfig;
use crate::metrics::{Metrics, names};
use crate::walk::{File, Notification, Severity, Walk};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use warden_fs::NormalizedPath;

/// How a path changed between two walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    Added,
    Removed,
    ContentChanged,
    MetadataChanged,
    Indeterminate,
    Unchanged,
}

impl ChangeKind {
    /// Every kind, in report order.
    pub const ALL: [ChangeKind; 6] = [
        Self::Added,
        Self::Removed,
        Self::ContentChanged,
        Self::MetadataChanged,
        Self::Indeterminate,
        Self::Unchanged,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::ContentChanged => "Content changed",
            Self::MetadataChanged => "Metadata changed",
            Self::Indeterminate => "Indeterminate",
            Self::Unchanged => "Unchanged",
        }
    }

    /// Name of the counter incremented for each path of this kind.
    pub fn counter(&self) -> &'static str {
        match self {
            Self::Added => names::REPORT_ADDED,
            Self::Removed => names::REPORT_REMOVED,
            Self::ContentChanged => names::REPORT_CONTENT_CHANGED,
            Self::MetadataChanged => names::REPORT_METADATA_CHANGED,
            Self::Indeterminate => names::REPORT_INDETERMINATE,
            Self::Unchanged => names::REPORT_UNCHANGED,
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of one path.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord<'w> {
    pub path: &'w NormalizedPath,
    pub kind: ChangeKind,
    pub before: Option<&'w File>,
    pub after: Option<&'w File>,
    /// Metadata differences, empty unless both sides exist
    pub diffs: Vec<FieldDiff>,
}

/// Result of comparing two walks.
#[derive(Debug, Clone)]
pub struct Comparison<'w> {
    records: Vec<ChangeRecord<'w>>,
    notifications: Vec<Notification>,
    excluded: usize,
}

impl<'w> Comparison<'w> {
    /// Every compared path, sorted by path.
    pub fn records(&self) -> &[ChangeRecord<'w>] {
        &self.records
    }

    /// Number of paths classified as `kind`.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// Count of every kind, including kinds with no paths.
    pub fn summary(&self) -> BTreeMap<ChangeKind, usize> {
        let mut summary: BTreeMap<ChangeKind, usize> =
            ChangeKind::ALL.iter().map(|k| (*k, 0)).collect();
        for record in &self.records {
            *summary.entry(record.kind).or_default() += 1;
        }
        summary
    }

    /// Paths of `kind` in path order.
    pub fn paths(&self, kind: ChangeKind) -> Vec<&'w NormalizedPath> {
        self.records
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.path)
            .collect()
    }

    /// Path lists of every kind except [`ChangeKind::Unchanged`].
    pub fn rule_summary(&self) -> BTreeMap<ChangeKind, Vec<&'w NormalizedPath>> {
        ChangeKind::ALL
            .iter()
            .filter(|k| **k != ChangeKind::Unchanged)
            .map(|k| (*k, self.paths(*k)))
            .collect()
    }

    /// Records of paths that changed in any way.
    pub fn changes(&self) -> impl Iterator<Item = &ChangeRecord<'w>> {
        self.records
            .iter()
            .filter(|r| r.kind != ChangeKind::Unchanged)
    }

    pub fn has_changes(&self) -> bool {
        self.changes().next().is_some()
    }

    /// Diagnostics raised while comparing.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Paths left out by an exclusion.
    pub fn excluded(&self) -> usize {
        self.excluded
    }
}

/// Compares two walks under a report configuration.
pub struct Comparer<'a> {
    config: &'a ReportConfig,
    metrics: &'a Metrics,
}

impl<'a> Comparer<'a> {
    pub fn new(config: &'a ReportConfig, metrics: &'a Metrics) -> Self {
        Self { config, metrics }
    }

    /// Compare `after` against `before`.
    ///
    /// Without a `before` walk every path of `after` is Added. Structural
    /// defects in either walk are reported as notifications and never stop
    /// the comparison.
    pub fn compare<'w>(&self, before: Option<&'w Walk>, after: &'w Walk) -> Comparison<'w> {
        let mut notes = Notes::new(self.metrics);

        if let Some(before) = before {
            if before.hostname() != after.hostname() {
                notes.push(Notification::warning(
                    NormalizedPath::new(""),
                    format!(
                        "comparing walks of different hosts: {} and {}",
                        before.hostname(),
                        after.hostname()
                    ),
                ));
            }
            if before.start_walk() > after.start_walk() {
                notes.push(Notification::warning(
                    NormalizedPath::new(""),
                    format!(
                        "before walk {} started after the after walk {}",
                        before.id(),
                        after.id()
                    ),
                ));
            }
        }

        let before_index = before
            .map(|walk| index(walk, &mut notes))
            .unwrap_or_default();
        let after_index = index(after, &mut notes);

        let mut exclusions: Vec<&NormalizedPath> = self.config.exclude.iter().collect();
        exclusions.extend(&after.policy().exclude);
        if let Some(before) = before {
            exclusions.extend(&before.policy().exclude);
        }

        let all_paths: BTreeSet<&'w NormalizedPath> = before_index
            .keys()
            .chain(after_index.keys())
            .copied()
            .collect();

        let mut excluded = 0;
        let paths: Vec<&'w NormalizedPath> = all_paths
            .into_iter()
            .filter(|path| {
                let skip = path.matches_any(exclusions.iter().copied());
                if skip {
                    excluded += 1;
                }
                !skip
            })
            .collect();
        self.metrics.add(names::REPORT_EXCLUDED, excluded as u64);

        let compare_access_time = self.config.compare_access_time;
        let records: Vec<ChangeRecord<'w>> = paths
            .par_iter()
            .filter_map(|path| {
                classify(
                    *path,
                    before_index.get(*path).copied(),
                    after_index.get(*path).copied(),
                    compare_access_time,
                )
            })
            .collect();

        for record in &records {
            self.metrics.incr(record.kind.counter());
            if record.kind == ChangeKind::Indeterminate {
                let side = if record.after.is_some_and(|f| f.fingerprint.is_some()) {
                    "before"
                } else {
                    "after"
                };
                notes.push(Notification::warning(
                    record.path.clone(),
                    format!("no fingerprint in {side} walk; content change cannot be determined"),
                ));
            }
        }

        let comparison = Comparison {
            records,
            notifications: notes.into_inner(),
            excluded,
        };
        tracing::info!(
            before = ?before.map(Walk::id),
            after = %after.id(),
            paths = comparison.records.len(),
            changed = comparison.changes().count(),
            excluded,
            "Compared walks"
        );
        comparison
    }
}

/// Path index of a walk. The first record of a duplicated path wins.
fn index<'w>(walk: &'w Walk, notes: &mut Notes<'_>) -> BTreeMap<&'w NormalizedPath, &'w File> {
    let mut index = BTreeMap::new();
    for file in walk.files() {
        if index.contains_key(&file.path) {
            notes.metrics.incr(names::COMPARE_DUPLICATE_PATH);
            let defect = Error::DuplicatePath {
                path: file.path.to_native(),
                walk_id: walk.id(),
            };
            notes.push(Notification::error(
                file.path.clone(),
                format!("{}: {defect}", defect.category()),
            ));
            continue;
        }
        index.insert(&file.path, file);
    }
    index
}

fn classify<'w>(
    path: &'w NormalizedPath,
    before: Option<&'w File>,
    after: Option<&'w File>,
    compare_access_time: bool,
) -> Option<ChangeRecord<'w>> {
    let (kind, diffs) = match (before, after) {
        (None, None) => return None,
        (None, Some(_)) => (ChangeKind::Added, Vec::new()),
        (Some(_), None) => (ChangeKind::Removed, Vec::new()),
        (Some(b), Some(a)) => {
            let diffs = metadata_diff(b, a, compare_access_time);
            let kind = match (&b.fingerprint, &a.fingerprint) {
                (Some(x), Some(y)) if x != y => ChangeKind::ContentChanged,
                (Some(_), None) | (None, Some(_)) => ChangeKind::Indeterminate,
                _ if !diffs.is_empty() => ChangeKind::MetadataChanged,
                _ => ChangeKind::Unchanged,
            };
            (kind, diffs)
        }
    };
    Some(ChangeRecord {
        path,
        kind,
        before,
        after,
        diffs,
    })
}

/// Notifications raised during one comparison.
struct Notes<'m> {
    notifications: Vec<Notification>,
    metrics: &'m Metrics,
}

impl<'m> Notes<'m> {
    fn new(metrics: &'m Metrics) -> Self {
        Self {
            notifications: Vec::new(),
            metrics,
        }
    }

    fn push(&mut self, notification: Notification) {
        let counter = match notification.severity {
            Severity::Info => names::NOTIFICATION_INFO,
            Severity::Warning => names::NOTIFICATION_WARNING,
            Severity::Error => names::NOTIFICATION_ERROR,
        };
        self.metrics.incr(counter);
        tracing::warn!(path = %notification.path, "{}", notification.message);
        self.notifications.push(notification);
    }

    fn into_inner(self) -> Vec<Notification> {
        self.notifications
    }
}
