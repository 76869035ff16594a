//! Traversal policy

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use warden_fs::{ConfigStore, NormalizedPath};

/// Files larger than this are not hashed unless the policy says otherwise.
pub const DEFAULT_MAX_HASH_FILE_SIZE: u64 = 1024 * 1024;

const POLICY_VERSION: u32 = 1;

/// Rules for one walk: what to visit, what to skip and what to hash.
///
/// A policy is immutable once loaded and is embedded in the walk it
/// produced, so a report can always tell which rules a snapshot followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Policy format version
    pub version: u32,
    /// Roots to walk. Roots must not nest.
    pub include: Vec<NormalizedPath>,
    /// Path prefixes that are neither recorded nor descended into
    pub exclude: Vec<NormalizedPath>,
    /// Path prefixes whose regular files get a content fingerprint
    pub hash: Vec<NormalizedPath>,
    /// Largest file, in bytes, that is fingerprinted
    pub max_hash_file_size: u64,
    /// Descend into directories on a different device than their root
    pub walk_cross_device: bool,
    /// Drop sockets, devices, FIFOs and symlinks instead of recording them
    pub ignore_irregular_files: bool,
    /// Deepest level below a root that is recorded; 0 means unlimited
    pub max_directory_depth: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION,
            include: Vec::new(),
            exclude: Vec::new(),
            hash: Vec::new(),
            max_hash_file_size: DEFAULT_MAX_HASH_FILE_SIZE,
            walk_cross_device: false,
            ignore_irregular_files: false,
            max_directory_depth: 0,
        }
    }
}

impl Policy {
    /// Load and validate a policy file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file is missing or malformed and
    /// [`Error::InvalidPolicy`] if it fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let policy: Policy = ConfigStore::new()
            .load(&NormalizedPath::new(path))
            .map_err(|e| Error::config(path, e))?;
        policy.validate()?;
        tracing::debug!(
            path = %path.display(),
            roots = policy.include.len(),
            "Loaded policy"
        );
        Ok(policy)
    }

    /// Check the policy can be walked.
    ///
    /// Roots must be present, absolute and must not nest: a nested root
    /// would record the same paths twice.
    pub fn validate(&self) -> Result<()> {
        if self.include.is_empty() {
            return Err(Error::InvalidPolicy {
                message: "at least one include root is required".into(),
            });
        }

        for root in &self.include {
            if !root.is_absolute() {
                return Err(Error::InvalidPolicy {
                    message: format!("include root {} is not absolute", root),
                });
            }
        }

        for (i, a) in self.include.iter().enumerate() {
            for b in &self.include[i + 1..] {
                if a == b {
                    return Err(Error::InvalidPolicy {
                        message: format!("include root {} is listed twice", a),
                    });
                }
                if a.starts_with(b) || b.starts_with(a) {
                    return Err(Error::InvalidPolicy {
                        message: format!("include roots {} and {} overlap", a, b),
                    });
                }
            }
        }

        Ok(())
    }

    /// True if `path` falls under an exclude prefix.
    pub fn is_excluded(&self, path: &NormalizedPath) -> bool {
        path.matches_any(&self.exclude)
    }

    /// True if `path` falls under a hash prefix.
    pub fn is_hash_candidate(&self, path: &NormalizedPath) -> bool {
        path.matches_any(&self.hash)
    }

    /// Depth limit below each root, if any.
    pub fn depth_limit(&self) -> Option<usize> {
        match self.max_directory_depth {
            0 => None,
            d => Some(d as usize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(include: &[&str]) -> Policy {
        Policy {
            include: include.iter().map(|p| NormalizedPath::new(p)).collect(),
            ..Policy::default()
        }
    }

    #[test]
    fn default_policy_limits() {
        let policy = Policy::default();
        assert_eq!(policy.max_hash_file_size, 1024 * 1024);
        assert!(!policy.walk_cross_device);
        assert_eq!(policy.depth_limit(), None);
    }

    #[test]
    fn validate_requires_roots() {
        let err = policy(&[]).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy { .. }));
    }

    #[test]
    fn validate_rejects_relative_roots() {
        assert!(policy(&["data"]).validate().is_err());
    }

    #[test]
    fn validate_rejects_nested_roots() {
        let err = policy(&["/data", "/data/sub"]).validate().unwrap_err();
        assert!(err.to_string().contains("overlap"), "got: {err}");
    }

    #[test]
    fn validate_rejects_duplicate_roots() {
        assert!(policy(&["/data", "/data/"]).validate().is_err());
    }

    #[test]
    fn validate_accepts_sibling_roots() {
        policy(&["/data", "/database"]).validate().unwrap();
    }

    #[test]
    fn exclusion_and_hash_prefixes() {
        let mut policy = policy(&["/"]);
        policy.exclude = vec![NormalizedPath::new("/proc")];
        policy.hash = vec![NormalizedPath::new("/etc")];

        assert!(policy.is_excluded(&NormalizedPath::new("/proc/1/status")));
        assert!(!policy.is_excluded(&NormalizedPath::new("/procfs")));
        assert!(policy.is_hash_candidate(&NormalizedPath::new("/etc/passwd")));
        assert!(!policy.is_hash_candidate(&NormalizedPath::new("/var/log")));
    }

    #[test]
    fn deserializes_with_defaults() {
        let policy: Policy = serde_json::from_str(r#"{"include": ["/data/"]}"#).unwrap();
        assert_eq!(policy.include, vec![NormalizedPath::new("/data")]);
        assert_eq!(policy.max_hash_file_size, DEFAULT_MAX_HASH_FILE_SIZE);
        assert_eq!(policy.version, 1);
    }
}
