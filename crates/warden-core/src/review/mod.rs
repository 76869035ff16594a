//! Reviewed baselines
//!
//! A [`Review`] names the walk a host's "last known good" state is taken
//! from and pins the artifact's content with a fingerprint. All reviews live
//! in one [`Reviews`] file, managed by a [`ReviewStore`].
//!
//! A baseline is only trusted when the referenced artifact still hashes to
//! the recorded fingerprint and still carries the recorded walk id.

mod approval;
mod resolve;

pub use approval::{AlwaysApprove, Approval, NeverApprove, PromotionRequest};
pub use resolve::{ResolvedWalks, WalkRequest, resolve_walks};

use crate::fingerprint::Fingerprint;
use crate::walk::persist::{LoadedWalk, load_walk};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use warden_fs::{ConfigStore, NormalizedPath};

const REVIEWS_VERSION: u32 = 1;

/// The approved baseline of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub walk_id: Uuid,
    /// Location of the walk artifact
    pub walk_reference: String,
    /// Fingerprint of the artifact's bytes
    pub fingerprint: Fingerprint,
}

impl Review {
    /// Review pinning a loaded walk.
    pub fn of(loaded: &LoadedWalk) -> Self {
        Self {
            walk_id: loaded.walk.id(),
            walk_reference: loaded.reference.to_string(),
            fingerprint: loaded.fingerprint.clone(),
        }
    }
}

/// Every host's review, keyed by hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reviews {
    pub version: u32,
    pub reviews: BTreeMap<String, Review>,
}

impl Default for Reviews {
    fn default() -> Self {
        Self {
            version: REVIEWS_VERSION,
            reviews: BTreeMap::new(),
        }
    }
}

impl Reviews {
    pub fn get(&self, hostname: &str) -> Option<&Review> {
        self.reviews.get(hostname)
    }

    /// Insert or replace the review of `hostname`, returning the old one.
    pub fn upsert(&mut self, hostname: impl Into<String>, review: Review) -> Option<Review> {
        self.reviews.insert(hostname.into(), review)
    }
}

/// Outcome of [`ReviewStore::promote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Promotion {
    Promoted(Review),
    Declined,
}

/// Reads and updates a reviews file.
///
/// The file format follows the extension (`.toml`, `.json`, `.yaml`).
#[derive(Debug, Clone)]
pub struct ReviewStore {
    path: PathBuf,
}

impl ReviewStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every review. A missing file holds no reviews.
    pub fn load(&self) -> Result<Reviews> {
        let path = NormalizedPath::new(&self.path);
        if !self.path.exists() {
            tracing::debug!(path = %path, "No reviews file");
            return Ok(Reviews::default());
        }
        ConfigStore::new()
            .load(&path)
            .map_err(|e| Error::persistence("read", &self.path, e))
    }

    /// Replace the reviews file atomically.
    pub fn save(&self, reviews: &Reviews) -> Result<()> {
        ConfigStore::new()
            .save(&NormalizedPath::new(&self.path), reviews)
            .map_err(|e| Error::persistence("write", &self.path, e))
    }

    /// The verified baseline walk of `hostname`, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] if the referenced artifact is unreadable,
    /// no longer matches the review's fingerprint or walk id, and
    /// [`Error::WalkMismatch`] if it was recorded on another host.
    pub fn baseline(&self, hostname: &str) -> Result<Option<LoadedWalk>> {
        let reviews = self.load()?;
        let Some(review) = reviews.get(hostname) else {
            tracing::info!(hostname, "No reviewed baseline");
            return Ok(None);
        };
        verify(hostname, review).map(Some)
    }

    /// Make `candidate` the baseline of `hostname` if `approval` agrees.
    ///
    /// The artifact is re-read from disk and must still match the
    /// fingerprint it was loaded with. A declined promotion leaves the
    /// reviews file untouched.
    pub fn promote(
        &self,
        hostname: &str,
        candidate: &LoadedWalk,
        approval: &dyn Approval,
    ) -> Result<Promotion> {
        if candidate.walk.hostname() != hostname {
            return Err(Error::WalkMismatch {
                path: candidate.reference.to_native(),
                expected: hostname.to_string(),
                actual: candidate.walk.hostname().to_string(),
            });
        }

        let mut reviews = self.load()?;
        let request = PromotionRequest {
            hostname,
            current: reviews.get(hostname),
            candidate,
        };
        if !approval.approve(&request)? {
            tracing::info!(hostname, "Promotion declined");
            return Ok(Promotion::Declined);
        }

        let on_disk = Fingerprint::of_file(&candidate.reference.to_native())
            .map_err(|e| Error::persistence("read", &candidate.reference, e))?;
        if on_disk != candidate.fingerprint {
            return Err(Error::Integrity {
                reference: candidate.reference.to_native(),
                message: format!(
                    "artifact changed since it was loaded: expected {}, found {}",
                    candidate.fingerprint, on_disk
                ),
            });
        }

        let review = Review::of(candidate);
        let previous = reviews.upsert(hostname, review.clone());
        self.save(&reviews)?;
        tracing::info!(
            hostname,
            walk_id = %review.walk_id,
            replaced = previous.is_some(),
            "Promoted baseline"
        );
        Ok(Promotion::Promoted(review))
    }
}

fn verify(hostname: &str, review: &Review) -> Result<LoadedWalk> {
    let reference = NormalizedPath::new(&review.walk_reference);
    let loaded = load_walk(&reference).map_err(|e| Error::Integrity {
        reference: reference.to_native(),
        message: format!("reviewed walk cannot be loaded: {e}"),
    })?;

    if loaded.fingerprint != review.fingerprint {
        return Err(Error::Integrity {
            reference: reference.to_native(),
            message: format!(
                "fingerprint mismatch: review has {}, artifact is {}",
                review.fingerprint, loaded.fingerprint
            ),
        });
    }
    if loaded.walk.id() != review.walk_id {
        return Err(Error::Integrity {
            reference: reference.to_native(),
            message: format!(
                "walk id mismatch: review has {}, artifact is {}",
                review.walk_id,
                loaded.walk.id()
            ),
        });
    }
    if loaded.walk.hostname() != hostname {
        return Err(Error::WalkMismatch {
            path: reference.to_native(),
            expected: hostname.to_string(),
            actual: loaded.walk.hostname().to_string(),
        });
    }

    tracing::debug!(hostname, walk_id = %review.walk_id, "Baseline verified");
    Ok(loaded)
}
