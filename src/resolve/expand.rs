//! Provider expansion: file handles to destination entries

use crate::provider::{FileClass, FileHandle, FileProvider, ResolvePass};
use crate::spec::{PatternFilter, RenameRule, RootSpec};
use crate::types::path::{join_archive, normalize_relative, to_archive_path};
use crate::types::{EntryKind, ResolvedEntry, SpecError};
use camino::Utf8PathBuf;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read-only snapshot of one node, shared by that node's provider jobs
#[derive(Debug)]
pub(crate) struct NodePlan {
    pub(crate) label: String,
    pub(crate) prefix: Utf8PathBuf,
    renames: Vec<RenameRule>,
    filter: PatternFilter,
    include_empty_dirs: bool,
}

impl NodePlan {
    pub(crate) fn new(root: &RootSpec, index: usize) -> Self {
        let node = root.node(index);
        Self {
            label: root.describe_index(index),
            prefix: root.prefix_of(index),
            renames: node.renames.clone(),
            filter: node.filter.clone(),
            include_empty_dirs: node.include_empty_dirs,
        }
    }
}

/// Entry found under a provider handle, before filtering and renaming
struct Candidate {
    relative: Utf8PathBuf,
    source: PathBuf,
    kind: EntryKind,
}

/// Evaluate one provider and turn its handles into entries for `plan`'s node
pub(crate) fn expand_provider(
    plan: &NodePlan,
    provider: &dyn FileProvider,
    pass: &ResolvePass,
) -> Result<Vec<ResolvedEntry>, SpecError> {
    let files = provider.resolve_in(pass).map_err(|e| match e {
        SpecError::SourceUnavailable { .. } => e,
        other => SpecError::source_unavailable(provider.describe(), other),
    })?;

    let mut entries = Vec::new();
    for handle in files.iter() {
        for candidate in expand_handle(plan, provider, handle)? {
            if let Some(entry) = place(plan, candidate)? {
                entries.push(entry);
            }
        }
    }

    tracing::debug!(
        spec = %plan.label,
        provider = %provider.describe(),
        entries = entries.len(),
        "provider expanded"
    );
    Ok(entries)
}

fn expand_handle(
    plan: &NodePlan,
    provider: &dyn FileProvider,
    handle: &FileHandle,
) -> Result<Vec<Candidate>, SpecError> {
    match handle.class() {
        FileClass::RegularFile => {
            let name = handle
                .path()
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| invalid_source(plan, handle.path(), "has no UTF-8 file name"))?;
            Ok(vec![Candidate {
                relative: Utf8PathBuf::from(name),
                source: handle.path().to_path_buf(),
                kind: EntryKind::File,
            }])
        }
        FileClass::Directory => walk_directory(plan, provider, handle.path()),
        FileClass::Excluded => {
            tracing::debug!(
                spec = %plan.label,
                path = %handle.path().display(),
                "skipping missing or special source"
            );
            Ok(Vec::new())
        }
    }
}

/// Regular files (and optionally empty directories) below `dir`, sorted by
/// relative path.
///
/// Entries that vanished mid-walk and symlink loops are skipped; any other
/// walk error makes the provider unavailable.
fn walk_directory(
    plan: &NodePlan,
    provider: &dyn FileProvider,
    dir: &Path,
) -> Result<Vec<Candidate>, SpecError> {
    let walker = ignore::WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(false)
        .follow_links(true)
        .build();

    let mut found = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) if is_skippable(&e) => {
                tracing::warn!(
                    spec = %plan.label,
                    dir = %dir.display(),
                    error = %e,
                    "skipping vanished or looping entry"
                );
                continue;
            }
            Err(e) => return Err(SpecError::source_unavailable(provider.describe(), e)),
        };
        if entry.depth() == 0 {
            continue;
        }

        let kind = match entry.file_type() {
            Some(ft) if ft.is_file() => EntryKind::File,
            Some(ft) if ft.is_dir() && plan.include_empty_dirs && is_empty_dir(entry.path()) => {
                EntryKind::Directory
            }
            _ => continue,
        };

        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let relative = to_archive_path(relative)
            .ok_or_else(|| invalid_source(plan, entry.path(), "is not valid UTF-8"))?;

        found.push(Candidate {
            relative,
            source: entry.path().to_path_buf(),
            kind,
        });
    }

    found.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(found)
}

fn is_skippable(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_skippable(err),
        ignore::Error::Partial(errs) => !errs.is_empty() && errs.iter().all(is_skippable),
        _ => err
            .io_error()
            .is_some_and(|io| io.kind() == ErrorKind::NotFound),
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

/// Filter, rename and prefix one candidate
fn place(plan: &NodePlan, candidate: Candidate) -> Result<Option<ResolvedEntry>, SpecError> {
    let Candidate {
        relative,
        source,
        kind,
    } = candidate;

    if !plan.filter.matches(&relative) {
        return Ok(None);
    }

    let original = join_archive(&plan.prefix, &relative);
    if kind == EntryKind::Directory {
        return Ok(Some(ResolvedEntry::directory(original, source)));
    }
    if plan.renames.is_empty() {
        return Ok(Some(ResolvedEntry::file(original, source)));
    }

    let renamed = plan
        .renames
        .iter()
        .fold(relative.clone(), |path, rule| rule.apply(&path));
    let renamed = normalize_relative(&renamed).map_err(|reason| SpecError::InvalidPath {
        path: renamed.to_string(),
        spec: plan.label.clone(),
        reason: reason.to_string(),
    })?;

    let entry = ResolvedEntry::file(join_archive(&plan.prefix, &renamed), source);
    if renamed == relative {
        Ok(Some(entry))
    } else {
        Ok(Some(entry.with_renamed_from(original)))
    }
}

fn invalid_source(plan: &NodePlan, path: &Path, reason: &str) -> SpecError {
    SpecError::InvalidPath {
        path: path.display().to_string(),
        spec: plan.label.clone(),
        reason: reason.to_string(),
    }
}
