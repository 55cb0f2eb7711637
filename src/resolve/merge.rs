//! Ordered merge of resolved entries under a duplicate policy

use crate::types::path::join_archive;
use crate::types::{DuplicatesStrategy, ResolvedEntry, SpecError};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;

/// Output sequence keyed by destination
///
/// Entries must be pushed in traversal order: that order decides which
/// entry wins and where it appears.
#[derive(Debug)]
pub(crate) struct EntryAccumulator {
    strategy: DuplicatesStrategy,
    entries: Vec<ResolvedEntry>,
    slots: HashMap<Utf8PathBuf, usize>,
}

impl EntryAccumulator {
    pub(crate) fn new(strategy: DuplicatesStrategy) -> Self {
        Self {
            strategy,
            entries: Vec::new(),
            slots: HashMap::new(),
        }
    }

    pub(crate) fn push(&mut self, mut entry: ResolvedEntry) -> Result<(), SpecError> {
        let Some(&slot) = self.slots.get(&entry.destination) else {
            self.insert(entry);
            return Ok(());
        };

        let existing = &self.entries[slot];
        if existing.is_directory() && entry.is_directory() {
            return Ok(());
        }

        match self.strategy {
            DuplicatesStrategy::Replace => {
                tracing::debug!(
                    destination = %entry.destination,
                    replaced = %existing.source.display(),
                    by = %entry.source.display(),
                    "duplicate replaced"
                );
                self.entries[slot] = entry;
            }
            DuplicatesStrategy::First => {
                tracing::debug!(
                    destination = %entry.destination,
                    dropped = %entry.source.display(),
                    "duplicate dropped"
                );
            }
            DuplicatesStrategy::Include => {
                let original = entry.destination.clone();
                entry.destination = self.free_name(&original);
                tracing::debug!(
                    destination = %original,
                    kept_as = %entry.destination,
                    "duplicate kept under new name"
                );
                if entry.renamed_from.is_none() {
                    entry.renamed_from = Some(original);
                }
                self.insert(entry);
            }
            DuplicatesStrategy::Fail => {
                return Err(SpecError::DuplicateEntry {
                    destination: entry.destination.to_string(),
                    first: existing.source.clone(),
                    second: entry.source,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn into_entries(self) -> Vec<ResolvedEntry> {
        self.entries
    }

    fn insert(&mut self, entry: ResolvedEntry) {
        self.slots.insert(entry.destination.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// `dir/stem~N.ext` with the smallest free `N >= 1`
    fn free_name(&self, destination: &Utf8Path) -> Utf8PathBuf {
        let parent = destination.parent().unwrap_or(Utf8Path::new(""));
        let stem = destination.file_stem().unwrap_or(destination.as_str());
        let extension = destination.extension();

        (1usize..)
            .map(|n| {
                let name = match extension {
                    Some(ext) => format!("{}~{}.{}", stem, n, ext),
                    None => format!("{}~{}", stem, n),
                };
                join_archive(parent, Utf8Path::new(&name))
            })
            .find(|candidate| !self.slots.contains_key(candidate))
            .unwrap_or_else(|| destination.to_path_buf())
    }
}
