//! Basic provider implementations

use super::{FileProvider, FileSet};
use crate::types::SpecError;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

type ResolveFn = dyn Fn() -> Result<FileSet, SpecError> + Send + Sync;

/// Provider backed by a closure
///
/// The closure runs on a worker thread at resolution time. Returning an
/// error aborts the assembly with `SourceUnavailable`.
pub struct FnProvider {
    label: String,
    func: Box<ResolveFn>,
    declared: Vec<PathBuf>,
}

impl FnProvider {
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn() -> Result<FileSet, SpecError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Box::new(func),
            declared: Vec::new(),
        }
    }

    /// Declare the input locations this closure reads
    pub fn with_declared_inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.declared = inputs;
        self
    }
}

impl fmt::Debug for FnProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider")
            .field("label", &self.label)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

impl FileProvider for FnProvider {
    fn resolve(&self) -> Result<FileSet, SpecError> {
        (self.func)().map_err(|err| match err {
            SpecError::SourceUnavailable { .. } => err,
            other => SpecError::source_unavailable(self.label.clone(), other),
        })
    }

    fn declared_inputs(&self) -> Vec<PathBuf> {
        self.declared.clone()
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// A fixed list of paths
///
/// Paths are not checked here; missing ones are dropped by classification
/// during expansion.
#[derive(Debug, Clone)]
pub struct FilesProvider {
    paths: Vec<PathBuf>,
}

impl FilesProvider {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl FileProvider for FilesProvider {
    fn resolve(&self) -> Result<FileSet, SpecError> {
        Ok(self.paths.iter().cloned().collect())
    }

    fn declared_inputs(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }

    fn describe(&self) -> String {
        match self.paths.as_slice() {
            [] => "files []".to_string(),
            [only] => format!("file {}", only.display()),
            [first, rest @ ..] => format!("files [{}, +{}]", first.display(), rest.len()),
        }
    }
}

/// A shared, settable, possibly-unset single file
///
/// Clones share the same slot, so a provider registered on the tree sees
/// later `set` calls.
#[derive(Debug, Clone, Default)]
pub struct OptionalFile {
    label: String,
    slot: Arc<RwLock<Option<PathBuf>>>,
}

impl OptionalFile {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            slot: Arc::default(),
        }
    }

    pub fn set(&self, path: Option<PathBuf>) {
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = path;
    }

    pub fn get(&self) -> Option<PathBuf> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl FileProvider for OptionalFile {
    fn resolve(&self) -> Result<FileSet, SpecError> {
        Ok(self.get().into_iter().collect())
    }

    fn declared_inputs(&self) -> Vec<PathBuf> {
        self.get().into_iter().collect()
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
