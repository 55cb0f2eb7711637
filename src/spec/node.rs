//! SpecNode - one node of the copy specification arena

use crate::provider::FileProvider;
use crate::types::SpecError;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use std::sync::Arc;

/// Stable handle to a node of one `RootSpec`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecId {
    pub(crate) tree: u64,
    pub(crate) index: usize,
}

type RenameFn = dyn Fn(&Utf8Path) -> Utf8PathBuf + Send + Sync;

/// Path transform applied to a node's own entries
///
/// The input is the entry path relative to the node's destination prefix;
/// the output is validated and re-joined onto the prefix.
#[derive(Clone)]
pub struct RenameRule(Arc<RenameFn>);

impl RenameRule {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Utf8Path) -> Utf8PathBuf + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    pub fn apply(&self, path: &Utf8Path) -> Utf8PathBuf {
        (self.0)(path)
    }
}

impl fmt::Debug for RenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenameRule(..)")
    }
}

/// Include/exclude globs matched against provider-relative paths
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    includes: Vec<String>,
    excludes: Vec<String>,
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
}

impl PatternFilter {
    pub fn add_include(&mut self, pattern: &str) -> Result<(), SpecError> {
        let mut includes = self.includes.clone();
        includes.push(pattern.to_string());
        self.include_set = Some(compile(&includes)?);
        self.includes = includes;
        Ok(())
    }

    pub fn add_exclude(&mut self, pattern: &str) -> Result<(), SpecError> {
        let mut excludes = self.excludes.clone();
        excludes.push(pattern.to_string());
        self.exclude_set = Some(compile(&excludes)?);
        self.excludes = excludes;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// An empty include list admits everything; excludes always win.
    pub fn matches(&self, path: &Utf8Path) -> bool {
        let included = self
            .include_set
            .as_ref()
            .map_or(true, |set| set.is_match(path.as_str()));
        let excluded = self
            .exclude_set
            .as_ref()
            .is_some_and(|set| set.is_match(path.as_str()));
        included && !excluded
    }
}

fn compile(patterns: &[String]) -> Result<GlobSet, SpecError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| SpecError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.kind().to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| SpecError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}

/// Arena node; siblings form an index-linked list so anchors stay valid
/// while other children are inserted around them.
#[derive(Clone, Default)]
pub(crate) struct SpecNode {
    pub(crate) subpath: Utf8PathBuf,
    /// Created by `subdir`, so later `subdir` calls with the same subpath reuse it
    pub(crate) named: bool,
    pub(crate) parent: Option<usize>,
    pub(crate) first_child: Option<usize>,
    pub(crate) last_child: Option<usize>,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
    /// Anchor this node was inserted after, if any
    pub(crate) after_anchor: Option<usize>,
    pub(crate) providers: Vec<Arc<dyn FileProvider>>,
    pub(crate) renames: Vec<RenameRule>,
    pub(crate) filter: PatternFilter,
    pub(crate) include_empty_dirs: bool,
}

impl fmt::Debug for SpecNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecNode")
            .field("subpath", &self.subpath)
            .field("parent", &self.parent)
            .field(
                "providers",
                &self.providers.iter().map(|p| p.describe()).collect::<Vec<_>>(),
            )
            .field("renames", &self.renames.len())
            .field("filter", &self.filter)
            .field("include_empty_dirs", &self.include_empty_dirs)
            .finish_non_exhaustive()
    }
}
