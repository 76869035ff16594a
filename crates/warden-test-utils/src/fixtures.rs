//! Hand-built walk records.
//!
//! Comparer tests need exact control over every field, which a real walk
//! cannot give. All timestamps are fixed so records compare equal across
//! calls.

use chrono::{DateTime, Duration, Utc};
use warden_core::{File, FileInfo, FileStat, Fingerprint, Policy, Walk, WalkBuilder};
use warden_fs::NormalizedPath;

/// 2023-11-14T22:13:20Z
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// A regular file record with fixed metadata and no fingerprint.
pub fn file(path: &str, size: u64) -> File {
    let path = NormalizedPath::new(path);
    let t = epoch();
    File {
        info: FileInfo {
            name: path.file_name().unwrap_or("").to_string(),
            size,
            mode: 0o644,
            modified: t,
            is_dir: false,
        },
        stat: FileStat {
            dev: 1,
            inode: 1000 + size,
            nlink: 1,
            mode: 0o100644,
            uid: 1000,
            gid: 1000,
            rdev: 0,
            size,
            blksize: 4096,
            blocks: size.div_ceil(512),
            atime: t,
            mtime: t,
            ctime: t,
        },
        path,
        fingerprint: None,
    }
}

/// A regular file record fingerprinted from `content`.
pub fn hashed_file(path: &str, content: &str) -> File {
    let mut file = file(path, content.len() as u64);
    file.fingerprint = Some(Fingerprint::of_bytes(content.as_bytes()));
    file
}

/// A directory record.
pub fn dir(path: &str) -> File {
    let mut file = file(path, 4096);
    file.info.is_dir = true;
    file.info.mode = 0o755;
    file.stat.mode = 0o040755;
    file
}

/// Shift every timestamp of `file` forward by `secs`.
pub fn touched(mut file: File, secs: i64) -> File {
    let d = Duration::seconds(secs);
    file.info.modified += d;
    file.stat.mtime += d;
    file.stat.ctime += d;
    file
}

/// A finished walk of `hostname` started `offset_secs` after [`epoch`].
pub fn walk(hostname: &str, offset_secs: i64, files: Vec<File>) -> Walk {
    walk_with_policy(hostname, offset_secs, Policy::default(), files)
}

pub fn walk_with_policy(hostname: &str, offset_secs: i64, policy: Policy, files: Vec<File>) -> Walk {
    let start = epoch() + Duration::seconds(offset_secs);
    let mut builder = WalkBuilder::new(policy)
        .hostname(hostname)
        .started_at(start);
    builder.extend_files(files);
    builder.finish_at(start + Duration::seconds(1))
}
