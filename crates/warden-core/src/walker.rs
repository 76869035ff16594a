//! Policy-driven traversal
//!
//! [`PolicyWalker`] walks every include root of a [`Policy`] on a bounded
//! worker pool and assembles the results into a [`Walk`].
//!
//! Per-path failures never abort a walk. They become ERROR notifications and
//! the walk carries on with the next entry.

use crate::config::Policy;
use crate::fingerprint::{ContentHasher, Fingerprinter, Selection};
use crate::metrics::{Metrics, names};
use crate::walk::{File, Notification, Severity, Walk, WalkBuilder, device_of};
use crate::{Error, Result};
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};
use walkdir::WalkDir;
use warden_fs::NormalizedPath;

/// Upper bound on traversal threads when no worker count is given.
const DEFAULT_MAX_WORKERS: usize = 8;

/// Receives records as they are produced.
///
/// Called concurrently from traversal workers.
pub trait WalkObserver: Send + Sync {
    fn on_file(&self, _file: &File) {}

    fn on_notification(&self, _notification: &Notification) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl WalkObserver for NoopObserver {}

/// Tunables of a walk that are not part of the policy.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Traversal threads; `None` uses the available parallelism, capped.
    pub workers: Option<usize>,
    /// Hostname recorded in the walk; `None` uses the local hostname.
    pub hostname: Option<String>,
    /// Replaces the policy's `max_hash_file_size`. The walk records the
    /// policy with the override applied.
    pub max_hash_file_size: Option<u64>,
}

/// Walks the include roots of a policy.
pub struct PolicyWalker<'a> {
    policy: Policy,
    options: WalkOptions,
    metrics: &'a Metrics,
    observer: &'a dyn WalkObserver,
    hasher: Option<&'a dyn ContentHasher>,
}

impl<'a> PolicyWalker<'a> {
    pub fn new(policy: Policy, metrics: &'a Metrics) -> Self {
        Self {
            policy,
            options: WalkOptions::default(),
            metrics,
            observer: &NoopObserver,
            hasher: None,
        }
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn WalkObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the SHA-256 file hasher.
    pub fn with_hasher(mut self, hasher: &'a dyn ContentHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Walk every include root and return the finished snapshot.
    ///
    /// # Errors
    ///
    /// Only an invalid policy or a worker pool that fails to start abort the
    /// walk. Filesystem failures are recorded as notifications.
    pub fn run(mut self) -> Result<Walk> {
        self.policy.validate()?;
        if let Some(max) = self.options.max_hash_file_size {
            self.policy.max_hash_file_size = max;
        }

        let mut builder = WalkBuilder::new(self.policy.clone());
        if let Some(hostname) = &self.options.hostname {
            builder = builder.hostname(hostname.clone());
        }

        let workers = self.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("warden-walk-{i}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        tracing::info!(
            roots = self.policy.include.len(),
            workers,
            "Starting walk"
        );

        let fingerprinter = Fingerprinter::from_policy(&self.policy);
        let sink = NotificationSink::new(self.metrics, self.observer);

        let per_root: Vec<Vec<File>> = pool.install(|| {
            self.policy
                .include
                .par_iter()
                .map(|root| self.walk_root(root, &fingerprinter, &sink))
                .collect()
        });

        for files in per_root {
            builder.extend_files(files);
        }
        builder.extend_notifications(sink.into_inner());

        let walk = builder.finish();
        tracing::info!(
            walk_id = %walk.id(),
            files = walk.files().len(),
            notifications = walk.notifications().len(),
            elapsed_ms = (walk.stop_walk() - walk.start_walk()).num_milliseconds(),
            "Walk complete"
        );
        Ok(walk)
    }

    fn worker_count(&self) -> usize {
        let ceiling = self.options.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(DEFAULT_MAX_WORKERS)
        });
        ceiling.clamp(1, self.policy.include.len().max(1))
    }

    /// Depth-first traversal of one root.
    fn walk_root(
        &self,
        root: &NormalizedPath,
        fingerprinter: &Fingerprinter,
        sink: &NotificationSink<'_>,
    ) -> Vec<File> {
        let policy = &self.policy;
        let metrics = self.metrics;
        let hasher: &dyn ContentHasher = match self.hasher {
            Some(hasher) => hasher,
            None => fingerprinter,
        };
        let mut files = Vec::new();
        metrics.incr(names::WALK_ROOT_COUNT);

        if policy.is_excluded(root) {
            tracing::debug!(root = %root, "Include root is excluded");
            metrics.incr(names::PATH_EXCLUDED);
            return files;
        }

        let root_dev = match std::fs::symlink_metadata(root.to_native()) {
            Ok(meta) => device_of(&meta),
            Err(e) => {
                metrics.incr(names::STAT_FAILED);
                sink.emit(Notification::error(
                    root.clone(),
                    format!("unable to stat include root: {e}"),
                ));
                return files;
            }
        };

        let mut walker = WalkDir::new(root.to_native())
            .follow_links(false)
            .follow_root_links(false);
        if let Some(depth) = policy.depth_limit() {
            walker = walker.max_depth(depth);
        }

        let mut entries = walker.into_iter().filter_entry(|entry| {
            let path = NormalizedPath::new(entry.path());
            if policy.is_excluded(&path) {
                tracing::debug!(path = %path, "Excluded");
                metrics.incr(names::PATH_EXCLUDED);
                false
            } else {
                true
            }
        });

        while let Some(next) = entries.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(NormalizedPath::new)
                        .unwrap_or_else(|| root.clone());
                    metrics.incr(names::STAT_FAILED);
                    sink.emit(Notification::error(path, format!("unable to read: {e}")));
                    continue;
                }
            };

            let Some(path) = NormalizedPath::from_native(entry.path()) else {
                if entry.file_type().is_dir() {
                    entries.skip_current_dir();
                }
                metrics.incr(names::PATH_NOT_UNICODE);
                sink.emit(Notification::error(
                    NormalizedPath::new(entry.path()),
                    "skipped: path is not valid Unicode",
                ));
                continue;
            };
            let metadata = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    metrics.incr(names::STAT_FAILED);
                    sink.emit(Notification::error(path, format!("unable to stat: {e}")));
                    continue;
                }
            };

            let file_type = metadata.file_type();
            if file_type.is_dir() {
                if !policy.walk_cross_device && device_of(&metadata) != root_dev {
                    entries.skip_current_dir();
                    metrics.incr(names::DIR_CROSS_DEVICE_SKIPPED);
                    sink.emit(Notification::info(
                        path,
                        "skipped: directory is on a different device than its include root",
                    ));
                    continue;
                }
                metrics.incr(names::DIR_COUNT);
            } else if file_type.is_file() {
                metrics.incr(names::FILE_COUNT);
            } else if policy.ignore_irregular_files {
                metrics.incr(names::IRREGULAR_IGNORED);
                continue;
            } else {
                metrics.incr(names::IRREGULAR_COUNT);
            }

            let fingerprint = match fingerprinter.select(&path, file_type.is_file(), metadata.len())
            {
                Selection::Skip => None,
                Selection::Oversized => {
                    metrics.incr(names::FILE_HASH_OVERSIZED);
                    sink.emit(Notification::warning(
                        path.clone(),
                        format!(
                            "not hashed: size {} exceeds max hash file size {}",
                            metadata.len(),
                            fingerprinter.max_size()
                        ),
                    ));
                    None
                }
                Selection::Hash => match hasher.fingerprint(entry.path()) {
                    Ok(fp) => {
                        metrics.incr(names::FILE_HASH_COUNT);
                        Some(fp)
                    }
                    Err(e) => {
                        metrics.incr(names::FILE_HASH_FAILED);
                        sink.emit(Notification::error(path.clone(), format!("unable to hash: {e}")));
                        None
                    }
                },
            };

            let file = File::from_metadata(path, &metadata, fingerprint);
            self.observer.on_file(&file);
            files.push(file);
        }

        tracing::debug!(root = %root, files = files.len(), "Root walked");
        files
    }
}

/// Collects notifications from all workers.
struct NotificationSink<'a> {
    notifications: Mutex<Vec<Notification>>,
    metrics: &'a Metrics,
    observer: &'a dyn WalkObserver,
}

impl<'a> NotificationSink<'a> {
    fn new(metrics: &'a Metrics, observer: &'a dyn WalkObserver) -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            metrics,
            observer,
        }
    }

    fn emit(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => {
                self.metrics.incr(names::NOTIFICATION_INFO);
                tracing::debug!(path = %notification.path, "{}", notification.message);
            }
            Severity::Warning => {
                self.metrics.incr(names::NOTIFICATION_WARNING);
                tracing::warn!(path = %notification.path, "{}", notification.message);
            }
            Severity::Error => {
                self.metrics.incr(names::NOTIFICATION_ERROR);
                tracing::warn!(path = %notification.path, "{}", notification.message);
            }
        }
        self.observer.on_notification(&notification);
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }

    fn into_inner(self) -> Vec<Notification> {
        self.notifications
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
