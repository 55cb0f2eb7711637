//! Classpath collection and its classified views

use super::{classify, FileClass, FileHandle, FileProvider, FileSet, FilesProvider, ResolvePass};
use crate::types::SpecError;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
enum Element {
    Paths(Vec<PathBuf>),
    Deferred(Arc<dyn FileProvider>),
}

/// Shared, mutable, possibly-unset classpath
///
/// Elements are either plain paths or providers for the outputs of other
/// build steps. An unset classpath resolves to nothing.
#[derive(Clone, Default)]
pub struct Classpath {
    elements: Arc<RwLock<Option<Vec<Element>>>>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the classpath with the given paths
    pub fn set<I, P>(&self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let element = Element::Paths(paths.into_iter().map(Into::into).collect());
        *self.elements.write().unwrap_or_else(|e| e.into_inner()) = Some(vec![element]);
    }

    /// Append paths, starting from an empty classpath if unset
    pub fn add<I, P>(&self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.push(Element::Paths(paths.into_iter().map(Into::into).collect()));
    }

    /// Append a deferred element, evaluated at resolution time
    pub fn add_provider(&self, provider: Arc<dyn FileProvider>) {
        self.push(Element::Deferred(provider));
    }

    pub fn clear(&self) {
        *self.elements.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_set(&self) -> bool {
        self.elements
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Statically configured paths, without evaluating deferred elements
    pub fn paths(&self) -> Vec<PathBuf> {
        self.snapshot()
            .into_iter()
            .flat_map(|element| match element {
                Element::Paths(paths) => paths,
                Element::Deferred(_) => Vec::new(),
            })
            .collect()
    }

    /// View of the entries of one class
    pub fn filter(&self, class: FileClass) -> ClasspathFilter {
        ClasspathFilter {
            classpath: self.clone(),
            class,
        }
    }

    /// Resolve once per pass; the directory and file views share the result
    fn resolve_shared(&self, pass: &ResolvePass) -> Result<FileSet, SpecError> {
        let key = Arc::as_ptr(&self.elements) as usize;
        pass.once(key, || self.resolve())
    }

    fn push(&self, element: Element) {
        let mut guard = self.elements.write().unwrap_or_else(|e| e.into_inner());
        guard.get_or_insert_with(Vec::new).push(element);
    }

    fn snapshot(&self) -> Vec<Element> {
        self.elements
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_default()
    }
}

impl fmt::Debug for Classpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classpath")
            .field("set", &self.is_set())
            .field("paths", &self.paths())
            .finish()
    }
}

impl FileProvider for Classpath {
    fn resolve(&self) -> Result<FileSet, SpecError> {
        let mut files = FileSet::new();
        for element in self.snapshot() {
            let resolved = match element {
                Element::Paths(paths) => FilesProvider::new(paths).resolve()?,
                Element::Deferred(provider) => provider.resolve()?,
            };
            files.extend_from(resolved);
        }
        Ok(files)
    }

    fn resolve_in(&self, pass: &ResolvePass) -> Result<FileSet, SpecError> {
        self.resolve_shared(pass)
    }

    fn declared_inputs(&self) -> Vec<PathBuf> {
        self.snapshot()
            .into_iter()
            .flat_map(|element| match element {
                Element::Paths(paths) => paths,
                Element::Deferred(provider) => provider.declared_inputs(),
            })
            .collect()
    }

    fn describe(&self) -> String {
        "classpath".to_string()
    }
}

/// Classpath entries of a single `FileClass`
#[derive(Debug, Clone)]
pub struct ClasspathFilter {
    classpath: Classpath,
    class: FileClass,
}

impl ClasspathFilter {
    fn select(&self, all: FileSet) -> FileSet {
        all.into_iter()
            .filter(|handle| classify(handle.path()) == self.class)
            .map(FileHandle::into_path)
            .collect()
    }
}

impl FileProvider for ClasspathFilter {
    fn resolve(&self) -> Result<FileSet, SpecError> {
        Ok(self.select(self.classpath.resolve()?))
    }

    fn resolve_in(&self, pass: &ResolvePass) -> Result<FileSet, SpecError> {
        Ok(self.select(self.classpath.resolve_shared(pass)?))
    }

    fn declared_inputs(&self) -> Vec<PathBuf> {
        self.classpath.declared_inputs()
    }

    fn describe(&self) -> String {
        match self.class {
            FileClass::Directory => "classpath directories".to_string(),
            FileClass::RegularFile => "classpath files".to_string(),
            FileClass::Excluded => "classpath (excluded)".to_string(),
        }
    }
}
