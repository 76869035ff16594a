//! Walk policy and report configuration
//!
//! Both are plain serde structs loaded through [`warden_fs::ConfigStore`],
//! so TOML, JSON and YAML files are accepted alike.

mod policy;
mod report;

pub use policy::{DEFAULT_MAX_HASH_FILE_SIZE, Policy};
pub use report::ReportConfig;
