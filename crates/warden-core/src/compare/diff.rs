//! Field-level differences between two records of the same path

use crate::walk::File;
use chrono::{DateTime, SecondsFormat, Utc};

/// One metadata field that differs between the before and after record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: &'static str,
    pub before: String,
    pub after: String,
}

impl std::fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} => {}", self.field, self.before, self.after)
    }
}

/// Collect the metadata differences of two records.
///
/// Fingerprints are not part of the delta. Access time is skipped when
/// `compare_access_time` is unset.
pub fn metadata_diff(before: &File, after: &File, compare_access_time: bool) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();
    let mut push = |field: &'static str, b: String, a: String| {
        if b != a {
            diffs.push(FieldDiff {
                field,
                before: b,
                after: a,
            });
        }
    };

    let (bi, ai) = (&before.info, &after.info);
    push("name", bi.name.clone(), ai.name.clone());
    push("size", bi.size.to_string(), ai.size.to_string());
    push("mode", octal(bi.mode), octal(ai.mode));
    push("modified", timestamp(bi.modified), timestamp(ai.modified));
    push("is_dir", bi.is_dir.to_string(), ai.is_dir.to_string());

    let (bs, as_) = (&before.stat, &after.stat);
    push("dev", bs.dev.to_string(), as_.dev.to_string());
    push("inode", bs.inode.to_string(), as_.inode.to_string());
    push("nlink", bs.nlink.to_string(), as_.nlink.to_string());
    push("stat.mode", octal(bs.mode), octal(as_.mode));
    push("uid", bs.uid.to_string(), as_.uid.to_string());
    push("gid", bs.gid.to_string(), as_.gid.to_string());
    push("rdev", bs.rdev.to_string(), as_.rdev.to_string());
    push("stat.size", bs.size.to_string(), as_.size.to_string());
    push("blksize", bs.blksize.to_string(), as_.blksize.to_string());
    push("blocks", bs.blocks.to_string(), as_.blocks.to_string());
    if compare_access_time {
        push("atime", timestamp(bs.atime), timestamp(as_.atime));
    }
    push("mtime", timestamp(bs.mtime), timestamp(as_.mtime));
    push("ctime", timestamp(bs.ctime), timestamp(as_.ctime));

    diffs
}

fn octal(mode: u32) -> String {
    format!("{:o}", mode)
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
