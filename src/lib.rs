//! # warpack - web archive copy specifications
//!
//! Describe where files land in an archive without knowing which files exist
//! yet, then resolve the description into an ordered, conflict-free list of
//! `(destination, source)` entries once the inputs are available.

// Module declarations
pub mod config;
pub mod provider;
pub mod spec;
pub mod resolve;
pub mod executor;
pub mod hash;
pub mod ui;
pub mod war;
pub mod commands;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use provider::{Classpath, FileProvider, FileSet};
pub use resolve::{resolve, resolve_cancellable};
pub use spec::{RootSpec, SpecId, SpecMut};
pub use types::{DuplicatesStrategy, EntryKind, ResolvedEntry, SpecError};
pub use war::{WarSpec, WAR_EXTENSION};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
