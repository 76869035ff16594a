//! Reading, writing and locating walk artifacts
//!
//! Walks are stored as pretty JSON. Artifacts are named
//! `<hostname>-<YYYYMMDD-HHMMSS>-walk.json` so the newest walk of a host can
//! be found in a directory of walks.

use super::Walk;
use crate::fingerprint::Fingerprint;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;
use warden_fs::{NormalizedPath, io};

/// Suffix of every walk artifact.
pub const WALK_SUFFIX: &str = "-walk.json";

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A walk read from disk, together with where it came from and the
/// fingerprint of the exact bytes that were parsed.
#[derive(Debug, Clone)]
pub struct LoadedWalk {
    pub walk: Walk,
    pub reference: NormalizedPath,
    pub fingerprint: Fingerprint,
}

/// File name for a walk of `hostname` taken at `at`.
pub fn walk_filename(hostname: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}{}", hostname, at.format(TIMESTAMP_FORMAT), WALK_SUFFIX)
}

/// Write `walk` to `path` atomically and return the artifact fingerprint.
pub fn write_walk(path: &NormalizedPath, walk: &Walk) -> Result<Fingerprint> {
    let content =
        serde_json::to_vec_pretty(walk).map_err(|e| Error::persistence("serialize", path, e))?;
    io::write_atomic(path, &content).map_err(|e| Error::persistence("write", path, e))?;
    tracing::info!(path = %path, walk_id = %walk.id(), files = walk.files().len(), "Wrote walk");
    Ok(Fingerprint::of_bytes(&content))
}

/// Read a walk artifact.
pub fn read_walk(path: &NormalizedPath) -> Result<Walk> {
    load_walk(path).map(|loaded| loaded.walk)
}

/// Read a walk artifact and fingerprint the bytes it was parsed from.
///
/// The reference of the result is absolute, so a review built from it
/// resolves the same way from any working directory.
pub fn load_walk(path: &NormalizedPath) -> Result<LoadedWalk> {
    let reference = std::path::absolute(path.to_native())
        .map(NormalizedPath::new)
        .map_err(|e| Error::persistence("locate", path, e))?;
    let content = io::read_bytes(path).map_err(|e| Error::persistence("read", path, e))?;
    let walk: Walk =
        serde_json::from_slice(&content).map_err(|e| Error::persistence("parse", path, e))?;
    tracing::debug!(path = %path, walk_id = %walk.id(), "Loaded walk");
    Ok(LoadedWalk {
        walk,
        reference,
        fingerprint: Fingerprint::of_bytes(&content),
    })
}

/// Find the newest walk artifact of `hostname` in `dir`.
///
/// Newness is taken from the timestamp in the file name, not from file
/// modification times.
pub fn latest_walk(dir: &Path, hostname: &str) -> Result<NormalizedPath> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::persistence("list", dir, e))?;
    let prefix = format!("{}-", hostname);

    let mut newest: Option<(NaiveDateTime, String)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| Error::persistence("list", dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(stamp) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(WALK_SUFFIX))
        else {
            continue;
        };
        let Ok(taken) = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) else {
            continue;
        };
        if newest.as_ref().is_none_or(|(t, n)| (taken, &name) > (*t, n)) {
            newest = Some((taken, name));
        }
    }

    match newest {
        Some((_, name)) => Ok(NormalizedPath::new(dir.join(name))),
        None => Err(Error::NoWalkFound {
            hostname: hostname.to_string(),
            dir: dir.to_path_buf(),
        }),
    }
}
