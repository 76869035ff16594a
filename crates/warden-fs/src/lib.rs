//! Filesystem primitives for warden
//!
//! Provides normalized path handling with prefix matching, atomic writes,
//! streamed SHA-256 digests and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
