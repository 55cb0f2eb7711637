//! Web archive layout
//!
//! A `WarSpec` pre-wires the standard web-archive structure in front of the
//! MainSpec:
//!
//! ```text
//! WEB-INF/
//!   classes/   directory entries of the classpath
//!   lib/       regular-file entries of the classpath
//!   web.xml    the deployment descriptor, whatever its source name
//! <main spec content>
//! ```
//!
//! The classpath and descriptor are read when the archive is resolved, not
//! when they are set, so they may point at outputs that don't exist yet.

use crate::config::Config;
use crate::provider::{Classpath, FileClass, FileProvider, OptionalFile};
use crate::resolve::resolve;
use crate::spec::{RootSpec, SpecId, SpecMut};
use crate::types::{ResolvedEntry, SpecError};
use camino::Utf8PathBuf;
use std::path::PathBuf;
use std::sync::Arc;

/// File extension of a web archive
pub const WAR_EXTENSION: &str = "war";

const WEB_INF: &str = "WEB-INF";
const CLASSES: &str = "classes";
const LIB: &str = "lib";
const WEB_XML: &str = "web.xml";

/// Copy specification for a web archive
#[derive(Debug)]
pub struct WarSpec {
    root: RootSpec,
    classpath: Classpath,
    web_xml: OptionalFile,
    web_inf: SpecId,
}

impl WarSpec {
    pub fn new() -> Self {
        let mut root = RootSpec::new();
        let classpath = Classpath::new();
        let web_xml = OptionalFile::new("deployment descriptor");

        let web_inf = {
            let mut before = root.add_child_before_main();
            let mut web_inf = before.named_child(Utf8PathBuf::from(WEB_INF));
            web_inf
                .named_child(Utf8PathBuf::from(CLASSES))
                .from(classpath.filter(FileClass::Directory));
            web_inf
                .named_child(Utf8PathBuf::from(LIB))
                .from(classpath.filter(FileClass::RegularFile));
            web_inf
                .add_child()
                .from(web_xml.clone())
                .rename(|_| Utf8PathBuf::from(WEB_XML));
            web_inf.id()
        };

        Self {
            root,
            classpath,
            web_xml,
            web_inf,
        }
    }

    /// Statically configured classpath paths, `None` while unset
    pub fn classpath(&self) -> Option<Vec<PathBuf>> {
        self.classpath.is_set().then(|| self.classpath.paths())
    }

    /// Replace the classpath
    pub fn set_classpath<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.classpath.set(paths);
    }

    /// Append to the classpath, whether or not it was set before
    pub fn add_classpath<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.classpath.add(paths);
    }

    /// Append a classpath element produced by another build step
    pub fn add_classpath_provider(&mut self, provider: Arc<dyn FileProvider>) {
        self.classpath.add_provider(provider);
    }

    pub fn clear_classpath(&mut self) {
        self.classpath.clear();
    }

    pub fn web_xml(&self) -> Option<PathBuf> {
        self.web_xml.get()
    }

    /// Set the deployment descriptor; it is archived as `WEB-INF/web.xml`
    pub fn set_web_xml(&mut self, path: Option<PathBuf>) {
        self.web_xml.set(path);
    }

    /// A fresh child of `WEB-INF` for extra content
    pub fn web_inf(&mut self) -> SpecMut<'_> {
        let mut web_inf = self.root.own_spec_mut(self.web_inf);
        let index = web_inf.add_child().id();
        self.root.own_spec_mut(index)
    }

    /// `web_inf` followed by a configuration closure
    pub fn configure_web_inf<F>(&mut self, configure: F) -> Result<SpecId, SpecError>
    where
        F: FnOnce(&mut SpecMut<'_>) -> Result<(), SpecError>,
    {
        let mut child = self.web_inf();
        configure(&mut child)?;
        Ok(child.id())
    }

    pub fn web_inf_id(&self) -> SpecId {
        self.web_inf
    }

    pub fn main_spec(&mut self) -> SpecMut<'_> {
        self.root.main_spec_mut()
    }

    pub fn root(&self) -> &RootSpec {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut RootSpec {
        &mut self.root
    }

    /// Resolve the whole archive
    pub fn resolve(&self, config: &Config) -> Result<Vec<ResolvedEntry>, SpecError> {
        resolve(&self.root, config)
    }

    pub fn declared_inputs(&self) -> Vec<PathBuf> {
        self.root.declared_inputs()
    }
}

impl Default for WarSpec {
    fn default() -> Self {
        Self::new()
    }
}
