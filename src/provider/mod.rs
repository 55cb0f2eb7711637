//! Lazy file providers
//!
//! A provider is evaluated only during resolution, never while the tree is
//! being configured. Each call may observe different filesystem state.

mod classify;
mod classpath;
mod pass;
mod sources;

pub use classify::{classify, is_directory, is_regular_file, partition, FileClass};
pub use classpath::{Classpath, ClasspathFilter};
pub use pass::ResolvePass;
pub use sources::{FilesProvider, FnProvider, OptionalFile};

use crate::types::SpecError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A source location returned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle(PathBuf);

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl From<PathBuf> for FileHandle {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for FileHandle {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

/// Insertion-ordered set of file handles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    handles: Vec<FileHandle>,
    seen: HashSet<FileHandle>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handle; returns false if it was already present
    pub fn insert(&mut self, handle: FileHandle) -> bool {
        if self.seen.contains(&handle) {
            return false;
        }
        self.seen.insert(handle.clone());
        self.handles.push(handle);
        true
    }

    pub fn extend_from(&mut self, other: FileSet) {
        for handle in other.handles {
            self.insert(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileHandle> {
        self.handles.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.handles.iter().map(FileHandle::path)
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for FileSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = FileSet::new();
        for path in iter {
            set.insert(FileHandle::new(path));
        }
        set
    }
}

impl IntoIterator for FileSet {
    type Item = FileHandle;
    type IntoIter = std::vec::IntoIter<FileHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.into_iter()
    }
}

/// A deferred file collection
///
/// Implementations must be safe to call repeatedly and from worker threads.
/// An absent or unset source resolves to an empty set, not an error.
pub trait FileProvider: Send + Sync {
    /// Evaluate the provider now.
    fn resolve(&self) -> Result<FileSet, SpecError>;

    /// Evaluate as part of a resolution pass. Providers over shared state
    /// memoise through the pass so each source is read once per pass.
    fn resolve_in(&self, _pass: &ResolvePass) -> Result<FileSet, SpecError> {
        self.resolve()
    }

    /// Static input locations, for incremental-build tracking.
    fn declared_inputs(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Human-readable label used in errors and logs.
    fn describe(&self) -> String;
}
