//! Report-time configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use warden_fs::{ConfigStore, NormalizedPath};

/// Exclusions applied only when comparing walks.
///
/// These never affect what a walk records. They are layered on top of the
/// exclusions of both walks' policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub version: u32,
    /// Path prefixes left out of every comparison
    pub exclude: Vec<NormalizedPath>,
    /// Report access-time differences. On by default; turn it off where
    /// reading a file to hash it updates its access time.
    pub compare_access_time: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exclude: Vec::new(),
            compare_access_time: true,
        }
    }
}

impl ReportConfig {
    /// Load a report configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        ConfigStore::new()
            .load(&NormalizedPath::new(path))
            .map_err(|e| Error::config(path, e))
    }

    /// Same configuration with additional exclusions.
    pub fn with_exclusions<I, P>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<NormalizedPath>,
    {
        self.exclude.extend(prefixes.into_iter().map(Into::into));
        self
    }
}
