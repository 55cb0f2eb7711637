//! Copy specification tree
//!
//! Nodes live in a single arena owned by `RootSpec`; parent/child links are
//! indices, so the tree has no ownership cycles and anchors stay stable
//! while siblings are inserted around them.

mod node;
mod root;

pub use node::{PatternFilter, RenameRule, SpecId};
pub use root::{RootSpec, SpecMut};

pub(crate) use node::SpecNode;
