//! RootSpec - node arena, MainSpec and traversal order

use super::node::{RenameRule, SpecId, SpecNode};
use crate::provider::{FileProvider, FileSet, FilesProvider, FnProvider};
use crate::types::path::{join_archive, parse_subpath};
use crate::types::SpecError;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const ROOT: usize = 0;

static NEXT_TREE: AtomicU64 = AtomicU64::new(1);

/// Owner of a specification tree
///
/// Node 0 is the structural root. The MainSpec is its first child at
/// construction and can never be removed; auxiliary top-level nodes are
/// placed relative to it with `add_child_before_main` /
/// `add_child_after_main`.
#[derive(Debug)]
pub struct RootSpec {
    tree: u64,
    nodes: Vec<SpecNode>,
    main: usize,
}

impl RootSpec {
    pub fn new() -> Self {
        let mut root = Self {
            tree: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            nodes: vec![SpecNode::default()],
            main: ROOT,
        };
        root.main = root.append_child(ROOT, Utf8PathBuf::new(), false);
        root
    }

    pub fn root_id(&self) -> SpecId {
        self.id(ROOT)
    }

    pub fn main_spec(&self) -> SpecId {
        self.id(self.main)
    }

    /// Number of nodes, including the structural root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
            && self.nodes.iter().all(|node| node.providers.is_empty())
    }

    /// Open a configuration cursor on `id`
    pub fn spec_mut(&mut self, id: SpecId) -> Result<SpecMut<'_>, SpecError> {
        let index = self.check(id).ok_or_else(|| SpecError::InvalidAnchor {
            anchor: "<foreign spec>".to_string(),
            parent: "<root>".to_string(),
        })?;
        Ok(SpecMut { root: self, index })
    }

    /// Cursor on a node whose id was handed out by this tree
    pub(crate) fn own_spec_mut(&mut self, id: SpecId) -> SpecMut<'_> {
        debug_assert_eq!(id.tree, self.tree);
        SpecMut {
            root: self,
            index: id.index,
        }
    }

    pub fn main_spec_mut(&mut self) -> SpecMut<'_> {
        let index = self.main;
        SpecMut { root: self, index }
    }

    /// Insert a top-level node before MainSpec (after earlier "before" nodes)
    pub fn add_child_before_main(&mut self) -> SpecMut<'_> {
        let index = self.link_before(ROOT, self.main);
        SpecMut { root: self, index }
    }

    /// Insert a top-level node after MainSpec (after earlier "after" nodes)
    pub fn add_child_after_main(&mut self) -> SpecMut<'_> {
        let index = self.link_after(ROOT, self.main);
        SpecMut { root: self, index }
    }

    /// Children of `id` in sequence order
    pub fn children(&self, id: SpecId) -> Vec<SpecId> {
        match self.check(id) {
            Some(index) => self.child_indices(index).map(|i| self.id(i)).collect(),
            None => Vec::new(),
        }
    }

    pub fn parent(&self, id: SpecId) -> Option<SpecId> {
        let index = self.check(id)?;
        self.nodes[index].parent.map(|p| self.id(p))
    }

    /// Concatenation of every ancestor's subpath
    pub fn effective_prefix(&self, id: SpecId) -> Option<Utf8PathBuf> {
        self.check(id).map(|index| self.prefix_of(index))
    }

    /// Pre-order walk: before-nodes, MainSpec subtree, after-nodes
    ///
    /// Stable for an unmodified tree; it decides both output order and which
    /// entry wins a destination collision.
    pub fn traversal_order(&self) -> Vec<SpecId> {
        self.traversal_indices()
            .into_iter()
            .map(|index| self.id(index))
            .collect()
    }

    /// Every provider's declared inputs in traversal order, without duplicates
    pub fn declared_inputs(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut inputs = Vec::new();
        for index in self.traversal_indices() {
            for provider in &self.nodes[index].providers {
                for input in provider.declared_inputs() {
                    if seen.insert(input.clone()) {
                        inputs.push(input);
                    }
                }
            }
        }
        inputs
    }

    /// User-facing name of a node (its destination, never its arena slot)
    pub fn describe(&self, id: SpecId) -> String {
        match self.check(id) {
            Some(index) => self.describe_index(index),
            None => "<foreign spec>".to_string(),
        }
    }

    // ── crate-internal access for the resolver ──────────────────

    pub(crate) fn traversal_indices(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            order.push(index);
            let children: Vec<usize> = self.child_indices(index).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    pub(crate) fn node(&self, index: usize) -> &SpecNode {
        &self.nodes[index]
    }

    pub(crate) fn prefix_of(&self, index: usize) -> Utf8PathBuf {
        let mut chain = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            chain.push(i);
            cursor = self.nodes[i].parent;
        }
        chain
            .iter()
            .rev()
            .fold(Utf8PathBuf::new(), |prefix, &i| {
                join_archive(&prefix, &self.nodes[i].subpath)
            })
    }

    pub(crate) fn describe_index(&self, index: usize) -> String {
        let prefix = self.prefix_of(index);
        if !prefix.as_str().is_empty() {
            prefix.into_string()
        } else if index == ROOT {
            "<root>".to_string()
        } else if index == self.main {
            "<main spec>".to_string()
        } else {
            "<archive root>".to_string()
        }
    }

    // ── arena plumbing ──────────────────────────────────────────

    fn id(&self, index: usize) -> SpecId {
        SpecId {
            tree: self.tree,
            index,
        }
    }

    fn check(&self, id: SpecId) -> Option<usize> {
        (id.tree == self.tree && id.index < self.nodes.len()).then_some(id.index)
    }

    fn child_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes[index].first_child, move |&i| self.nodes[i].next)
    }

    fn push_node(&mut self, parent: usize, subpath: Utf8PathBuf, named: bool) -> usize {
        let index = self.nodes.len();
        self.nodes.push(SpecNode {
            subpath,
            named,
            parent: Some(parent),
            ..SpecNode::default()
        });
        index
    }

    fn append_child(&mut self, parent: usize, subpath: Utf8PathBuf, named: bool) -> usize {
        let index = self.push_node(parent, subpath, named);
        match self.nodes[parent].last_child {
            Some(last) => {
                self.nodes[last].next = Some(index);
                self.nodes[index].prev = Some(last);
            }
            None => self.nodes[parent].first_child = Some(index),
        }
        self.nodes[parent].last_child = Some(index);
        index
    }

    /// Link a new node immediately before `anchor`. Caller checked parentage.
    fn link_before(&mut self, parent: usize, anchor: usize) -> usize {
        let index = self.push_node(parent, Utf8PathBuf::new(), false);
        let prev = self.nodes[anchor].prev;
        self.nodes[index].prev = prev;
        self.nodes[index].next = Some(anchor);
        self.nodes[anchor].prev = Some(index);
        match prev {
            Some(p) => self.nodes[p].next = Some(index),
            None => self.nodes[parent].first_child = Some(index),
        }
        index
    }

    /// Link a new node after `anchor` and after the last node previously
    /// inserted after the same anchor, wherever later inserts moved it.
    /// Caller checked parentage.
    fn link_after(&mut self, parent: usize, anchor: usize) -> usize {
        let cursor = std::iter::successors(Some(anchor), |&i| self.nodes[i].next)
            .filter(|&i| i == anchor || self.nodes[i].after_anchor == Some(anchor))
            .last()
            .unwrap_or(anchor);

        let index = self.push_node(parent, Utf8PathBuf::new(), false);
        self.nodes[index].after_anchor = Some(anchor);
        let next = self.nodes[cursor].next;
        self.nodes[index].prev = Some(cursor);
        self.nodes[index].next = next;
        self.nodes[cursor].next = Some(index);
        match next {
            Some(n) => self.nodes[n].prev = Some(index),
            None => self.nodes[parent].last_child = Some(index),
        }
        index
    }

    fn anchor_child(&self, parent: usize, anchor: SpecId) -> Result<usize, SpecError> {
        match self.check(anchor) {
            Some(index) if self.nodes[index].parent == Some(parent) => Ok(index),
            Some(index) => Err(SpecError::InvalidAnchor {
                anchor: self.describe_index(index),
                parent: self.describe_index(parent),
            }),
            None => Err(SpecError::InvalidAnchor {
                anchor: "<foreign spec>".to_string(),
                parent: self.describe_index(parent),
            }),
        }
    }
}

impl Default for RootSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable configuration cursor on one node
///
/// These methods are the only way to change a tree. Every method that
/// creates a child returns a cursor on it, borrowed from this one.
pub struct SpecMut<'a> {
    root: &'a mut RootSpec,
    index: usize,
}

impl SpecMut<'_> {
    pub fn id(&self) -> SpecId {
        self.root.id(self.index)
    }

    pub fn effective_prefix(&self) -> Utf8PathBuf {
        self.root.prefix_of(self.index)
    }

    /// Child for `subpath`, created on first use.
    ///
    /// Repeated calls with the same subpath return the same node, so
    /// providers added through each call accumulate in call order.
    pub fn subdir(&mut self, subpath: &str) -> Result<SpecMut<'_>, SpecError> {
        let parsed = parse_subpath(subpath).map_err(|reason| SpecError::InvalidPath {
            path: subpath.to_string(),
            spec: self.root.describe_index(self.index),
            reason: reason.to_string(),
        })?;
        Ok(self.named_child(parsed))
    }

    /// `subdir` for a subpath that is already validated
    pub(crate) fn named_child(&mut self, subpath: Utf8PathBuf) -> SpecMut<'_> {
        let existing = self
            .root
            .child_indices(self.index)
            .find(|&i| self.root.nodes[i].named && self.root.nodes[i].subpath == subpath);
        let index = match existing {
            Some(index) => index,
            None => self.root.append_child(self.index, subpath, true),
        };
        SpecMut {
            root: &mut *self.root,
            index,
        }
    }

    /// `subdir` followed by a configuration closure on the child
    pub fn subdir_with<F>(&mut self, subpath: &str, configure: F) -> Result<SpecId, SpecError>
    where
        F: FnOnce(&mut SpecMut<'_>) -> Result<(), SpecError>,
    {
        let mut child = self.subdir(subpath)?;
        configure(&mut child)?;
        Ok(child.id())
    }

    /// Append a fresh unnamed child
    pub fn add_child(&mut self) -> SpecMut<'_> {
        let index = self
            .root
            .append_child(self.index, Utf8PathBuf::new(), false);
        SpecMut {
            root: &mut *self.root,
            index,
        }
    }

    /// Insert a new child immediately before `anchor`
    pub fn add_child_before(&mut self, anchor: SpecId) -> Result<SpecMut<'_>, SpecError> {
        let anchor = self.root.anchor_child(self.index, anchor)?;
        let index = self.root.link_before(self.index, anchor);
        Ok(SpecMut {
            root: &mut *self.root,
            index,
        })
    }

    /// Insert a new child after `anchor` (and after earlier inserts after it)
    pub fn add_child_after(&mut self, anchor: SpecId) -> Result<SpecMut<'_>, SpecError> {
        let anchor = self.root.anchor_child(self.index, anchor)?;
        let index = self.root.link_after(self.index, anchor);
        Ok(SpecMut {
            root: &mut *self.root,
            index,
        })
    }

    pub fn from<P>(&mut self, provider: P) -> &mut Self
    where
        P: FileProvider + 'static,
    {
        self.from_shared(Arc::new(provider))
    }

    pub fn from_shared(&mut self, provider: Arc<dyn FileProvider>) -> &mut Self {
        self.root.nodes[self.index].providers.push(provider);
        self
    }

    pub fn from_paths<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.from(FilesProvider::new(paths))
    }

    pub fn from_fn<F>(&mut self, label: &str, func: F) -> &mut Self
    where
        F: Fn() -> Result<FileSet, SpecError> + Send + Sync + 'static,
    {
        self.from(FnProvider::new(label, func))
    }

    /// Append a rename rule for this node's own entries
    pub fn rename<F>(&mut self, transform: F) -> &mut Self
    where
        F: Fn(&Utf8Path) -> Utf8PathBuf + Send + Sync + 'static,
    {
        self.root.nodes[self.index]
            .renames
            .push(RenameRule::new(transform));
        self
    }

    pub fn include(&mut self, pattern: &str) -> Result<&mut Self, SpecError> {
        self.root.nodes[self.index].filter.add_include(pattern)?;
        Ok(self)
    }

    pub fn exclude(&mut self, pattern: &str) -> Result<&mut Self, SpecError> {
        self.root.nodes[self.index].filter.add_exclude(pattern)?;
        Ok(self)
    }

    /// Emit empty directories found in directory sources as markers
    pub fn include_empty_dirs(&mut self, include: bool) -> &mut Self {
        self.root.nodes[self.index].include_empty_dirs = include;
        self
    }
}
