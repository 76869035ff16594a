//! Choosing the two walks of a report

use super::ReviewStore;
use crate::walk::local_hostname;
use crate::walk::persist::{LoadedWalk, latest_walk, load_walk};
use crate::{Error, Result};
use std::path::PathBuf;
use warden_fs::NormalizedPath;

/// Where the walks of a report come from.
///
/// Explicit `before_file` / `after_file` locators take precedence over
/// everything else: when either is given, the reviews file is not consulted.
#[derive(Debug, Clone, Default)]
pub struct WalkRequest {
    /// Host under review. Defaults to the host of an explicit after walk,
    /// otherwise to the local hostname.
    pub hostname: Option<String>,
    pub review_file: Option<PathBuf>,
    /// Directory searched for the newest walk of the host
    pub walk_dir: Option<PathBuf>,
    pub before_file: Option<PathBuf>,
    pub after_file: Option<PathBuf>,
}

/// The walks a report compares.
#[derive(Debug, Clone)]
pub struct ResolvedWalks {
    pub hostname: String,
    /// `None` when the host has no reviewed baseline yet
    pub before: Option<LoadedWalk>,
    pub after: LoadedWalk,
}

/// Resolve the before and after walk of `request`.
///
/// # Errors
///
/// Fails if no after walk can be located, if a walk belongs to another
/// host, or if the reviewed baseline fails its integrity checks.
pub fn resolve_walks(request: &WalkRequest) -> Result<ResolvedWalks> {
    let explicit = request.before_file.is_some() || request.after_file.is_some();

    let (hostname, after) = match &request.after_file {
        Some(file) => {
            let after = load_walk(&NormalizedPath::new(file))?;
            let hostname = request
                .hostname
                .clone()
                .unwrap_or_else(|| after.walk.hostname().to_string());
            (hostname, after)
        }
        None => {
            let hostname = request.hostname.clone().unwrap_or_else(local_hostname);
            let Some(dir) = &request.walk_dir else {
                return Err(Error::Unresolved {
                    message: "no after walk: give an after file or a walk directory".into(),
                });
            };
            let latest = latest_walk(dir, &hostname)?;
            (hostname, load_walk(&latest)?)
        }
    };
    check_host(&hostname, &after)?;

    let before = match (&request.before_file, &request.review_file) {
        (Some(file), _) => Some(load_walk(&NormalizedPath::new(file))?),
        (None, Some(_)) if explicit => None,
        (None, Some(review_file)) => ReviewStore::new(review_file).baseline(&hostname)?,
        (None, None) => None,
    };

    tracing::info!(
        hostname = %hostname,
        before = ?before.as_ref().map(|b| b.reference.as_str()),
        after = %after.reference,
        "Resolved walks"
    );
    Ok(ResolvedWalks {
        hostname,
        before,
        after,
    })
}

fn check_host(hostname: &str, loaded: &LoadedWalk) -> Result<()> {
    if loaded.walk.hostname() == hostname {
        Ok(())
    } else {
        Err(Error::WalkMismatch {
            path: loaded.reference.to_native(),
            expected: hostname.to_string(),
            actual: loaded.walk.hostname().to_string(),
        })
    }
}
