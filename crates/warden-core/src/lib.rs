//! File integrity monitoring for warden
//!
//! This crate walks policy-selected file trees into immutable snapshots,
//! compares snapshots and manages the reviewed baseline of each host:
//!
//! - **PolicyWalker**: parallel traversal of include roots into a [`Walk`]
//! - **Fingerprinter**: streamed SHA-256 content fingerprints
//! - **Comparer**: deterministic, path-ordered classification of changes
//! - **ReviewStore**: integrity-checked "last known good" walk per host
//! - **Metrics**: named counters shared by all of the above
//!
//! # Architecture
//!
//! ```text
//!   Policy ─► PolicyWalker ─► Walk ─► persist ─► <host>-<time>-walk.json
//!                                                        │
//!   Reviews ─► ReviewStore ─► baseline walk ──┐          │
//!                                             ├─► Comparer ─► Comparison
//!                                 after walk ─┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use warden_core::{Comparer, Metrics, Policy, PolicyWalker, ReportConfig};
//!
//! fn example() -> warden_core::Result<()> {
//!     let metrics = Metrics::new();
//!     let policy = Policy::load("policy.toml".as_ref())?;
//!     let walk = PolicyWalker::new(policy, &metrics).run()?;
//!     let config = ReportConfig::default();
//!     let comparison = Comparer::new(&config, &metrics).compare(None, &walk);
//!     assert!(comparison.has_changes() || walk.files().is_empty());
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod metrics;
pub mod review;
pub mod walk;
pub mod walker;

pub use compare::{ChangeKind, ChangeRecord, Comparer, Comparison, FieldDiff};
pub use config::{DEFAULT_MAX_HASH_FILE_SIZE, Policy, ReportConfig};
pub use error::{Error, ErrorCategory, Result};
pub use fingerprint::{ContentHasher, Fingerprint, Fingerprinter, HashMethod, Selection};
pub use metrics::Metrics;
pub use review::{
    AlwaysApprove, Approval, NeverApprove, Promotion, PromotionRequest, ResolvedWalks, Review,
    ReviewStore, Reviews, WalkRequest, resolve_walks,
};
pub use walk::persist::{LoadedWalk, latest_walk, load_walk, read_walk, walk_filename, write_walk};
pub use walk::{File, FileInfo, FileStat, Notification, Severity, Walk, WalkBuilder, local_hostname};
pub use walker::{NoopObserver, PolicyWalker, WalkObserver, WalkOptions};
