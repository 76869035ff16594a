//! Content fingerprints
//!
//! Decides which files get hashed and streams their content through
//! SHA-256 in bounded chunks.

use crate::config::Policy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use warden_fs::{NormalizedPath, checksum};

/// Content-hash algorithm of a [`Fingerprint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashMethod {
    #[serde(rename = "SHA256")]
    Sha256,
}

impl std::fmt::Display for HashMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "{}", checksum::ALGORITHM),
        }
    }
}

/// A (method, digest) pair identifying file content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub method: HashMethod,
    pub value: String,
}

impl Fingerprint {
    pub fn sha256(value: impl Into<String>) -> Self {
        Self {
            method: HashMethod::Sha256,
            value: value.into(),
        }
    }

    /// Fingerprint of an in-memory buffer.
    pub fn of_bytes(content: &[u8]) -> Self {
        Self::sha256(checksum::sha256_bytes(content))
    }

    /// Fingerprint of a file, streamed from disk.
    pub fn of_file(path: &Path) -> warden_fs::Result<Self> {
        checksum::sha256_file(path).map(Self::sha256)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.method, self.value)
    }
}

/// Outcome of the hashing rules for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Not under a hash prefix, or not a regular file
    Skip,
    /// Under a hash prefix but larger than the size limit
    Oversized,
    /// Fingerprint it
    Hash,
}

/// Applies a policy's hashing rules.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    prefixes: Vec<NormalizedPath>,
    max_size: u64,
}

impl Fingerprinter {
    pub fn new(prefixes: Vec<NormalizedPath>, max_size: u64) -> Self {
        Self { prefixes, max_size }
    }

    pub fn from_policy(policy: &Policy) -> Self {
        Self::new(policy.hash.clone(), policy.max_hash_file_size)
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Decide whether an entry is fingerprinted.
    pub fn select(&self, path: &NormalizedPath, is_regular: bool, size: u64) -> Selection {
        if !is_regular || !path.matches_any(&self.prefixes) {
            Selection::Skip
        } else if size > self.max_size {
            Selection::Oversized
        } else {
            Selection::Hash
        }
    }

}

/// Produces the fingerprint of a selected file.
pub trait ContentHasher: Send + Sync {
    /// # Errors
    ///
    /// A failure to open or read the file aborts this fingerprint only.
    fn fingerprint(&self, path: &Path) -> warden_fs::Result<Fingerprint>;
}

impl ContentHasher for Fingerprinter {
    /// Stream `path` through SHA-256.
    fn fingerprint(&self, path: &Path) -> warden_fs::Result<Fingerprint> {
        Fingerprint::of_file(path)
    }
}
