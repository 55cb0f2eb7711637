//! Core type definitions for warpack

mod entry;
mod error;
pub mod path;
mod policy;

pub use entry::{EntryKind, ResolvedEntry};
pub use error::SpecError;
pub use policy::DuplicatesStrategy;
