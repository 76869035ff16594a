//! Walk snapshots
//!
//! A [`Walk`] is one completed, immutable snapshot of the files a policy
//! selected. It is assembled by a [`WalkBuilder`] and never changes after
//! [`WalkBuilder::finish`].

pub mod persist;

use crate::config::Policy;
use crate::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use uuid::Uuid;
use warden_fs::NormalizedPath;

const WALK_VERSION: u32 = 1;

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A non-fatal diagnostic tied to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub path: NormalizedPath,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, path: NormalizedPath, message: impl Into<String>) -> Self {
        Self {
            severity,
            path,
            message: message.into(),
        }
    }

    pub fn info(path: NormalizedPath, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, path, message)
    }

    pub fn warning(path: NormalizedPath, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, path, message)
    }

    pub fn error(path: NormalizedPath, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, path, message)
    }
}

/// Summary metadata of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    /// Permission bits
    pub mode: u32,
    pub modified: DateTime<Utc>,
    pub is_dir: bool,
}

/// Raw `stat` metadata of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub dev: u64,
    pub inode: u64,
    pub nlink: u64,
    /// File type and permission bits
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: u64,
    pub blksize: u64,
    pub blocks: u64,
    pub atime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
    pub ctime: DateTime<Utc>,
}

/// One recorded path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: NormalizedPath,
    pub info: FileInfo,
    pub stat: FileStat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
}

impl File {
    /// Build a record from `lstat` metadata.
    pub fn from_metadata(
        path: NormalizedPath,
        metadata: &Metadata,
        fingerprint: Option<Fingerprint>,
    ) -> Self {
        let stat = FileStat::from_metadata(metadata);
        let info = FileInfo {
            name: path.file_name().unwrap_or(path.as_str()).to_string(),
            size: metadata.len(),
            mode: stat.mode & 0o7777,
            modified: stat.mtime,
            is_dir: metadata.is_dir(),
        };
        Self {
            path,
            info,
            stat,
            fingerprint,
        }
    }
}

impl FileStat {
    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            dev: metadata.dev(),
            inode: metadata.ino(),
            nlink: metadata.nlink(),
            mode: metadata.mode(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            rdev: metadata.rdev(),
            size: metadata.size(),
            blksize: metadata.blksize(),
            blocks: metadata.blocks(),
            atime: unix_time(metadata.atime(), metadata.atime_nsec()),
            mtime: unix_time(metadata.mtime(), metadata.mtime_nsec()),
            ctime: unix_time(metadata.ctime(), metadata.ctime_nsec()),
        }
    }

    #[cfg(not(unix))]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let time = |t: std::io::Result<std::time::SystemTime>| {
            t.map(DateTime::<Utc>::from).unwrap_or_default()
        };
        Self {
            dev: 0,
            inode: 0,
            nlink: 1,
            mode: if metadata.permissions().readonly() { 0o444 } else { 0o644 },
            uid: 0,
            gid: 0,
            rdev: 0,
            size: metadata.len(),
            blksize: 0,
            blocks: 0,
            atime: time(metadata.accessed()),
            mtime: time(metadata.modified()),
            ctime: time(metadata.created()),
        }
    }
}

/// Device id of an entry, used by the cross-device rule.
#[cfg(unix)]
pub(crate) fn device_of(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.dev()
}

#[cfg(not(unix))]
pub(crate) fn device_of(_metadata: &Metadata) -> u64 {
    0
}

#[cfg(unix)]
fn unix_time(secs: i64, nsecs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, nsecs.clamp(0, 999_999_999) as u32).unwrap_or_default()
}

/// Name of the machine walks are recorded on.
pub fn local_hostname() -> String {
    match hostname::get().map(|h| h.into_string()) {
        Ok(Ok(name)) => name,
        Ok(Err(raw)) => raw.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "Unable to determine hostname");
            "unknown".to_string()
        }
    }
}

/// A completed snapshot of a policy-defined file set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walk {
    version: u32,
    id: Uuid,
    hostname: String,
    start_walk: DateTime<Utc>,
    stop_walk: DateTime<Utc>,
    policy: Policy,
    files: Vec<File>,
    notifications: Vec<Notification>,
}

impl Walk {
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn start_walk(&self) -> DateTime<Utc> {
        self.start_walk
    }

    pub fn stop_walk(&self) -> DateTime<Utc> {
        self.stop_walk
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Recorded files. Their order carries no meaning.
    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// First file recorded under `path`.
    pub fn file(&self, path: &NormalizedPath) -> Option<&File> {
        self.files.iter().find(|f| &f.path == path)
    }
}

/// Assembles a [`Walk`].
#[derive(Debug)]
pub struct WalkBuilder {
    id: Uuid,
    hostname: String,
    start_walk: DateTime<Utc>,
    policy: Policy,
    files: Vec<File>,
    notifications: Vec<Notification>,
}

impl WalkBuilder {
    /// Start a walk now, on this host, with a fresh id.
    pub fn new(policy: Policy) -> Self {
        Self {
            id: Uuid::new_v4(),
            hostname: local_hostname(),
            start_walk: Utc::now(),
            policy,
            files: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn started_at(mut self, start: DateTime<Utc>) -> Self {
        self.start_walk = start;
        self
    }

    pub fn push_file(&mut self, file: File) {
        self.files.push(file);
    }

    pub fn extend_files(&mut self, files: impl IntoIterator<Item = File>) {
        self.files.extend(files);
    }

    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn extend_notifications(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        self.notifications.extend(notifications);
    }

    /// Stamp the stop time and freeze the walk.
    pub fn finish(self) -> Walk {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(self, stop: DateTime<Utc>) -> Walk {
        Walk {
            version: WALK_VERSION,
            id: self.id,
            hostname: self.hostname,
            start_walk: self.start_walk,
            stop_walk: stop.max(self.start_walk),
            policy: self.policy,
            files: self.files,
            notifications: self.notifications,
        }
    }
}
