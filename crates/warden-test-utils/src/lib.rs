//! Shared test utilities for the warden workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] builder for real directory trees to walk
//! - [`fixtures`]: hand-built [`File`](warden_core::File) and
//!   [`Walk`](warden_core::Walk) records for comparer tests

pub mod fixtures;
pub mod tree;

pub use tree::TestTree;
