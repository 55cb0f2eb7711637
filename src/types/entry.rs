//! ResolvedEntry - one (destination, source) pair handed to an archive writer

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the writer should materialise at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file copied from `source`
    File,
    /// Explicit (empty) directory marker
    Directory,
}

/// A fully resolved archive entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// Path inside the archive, always relative and `/`-separated
    pub destination: Utf8PathBuf,

    /// Source file (or directory, for markers) on disk
    pub source: PathBuf,

    /// Destination the entry had before rename rules applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<Utf8PathBuf>,

    pub kind: EntryKind,
}

impl ResolvedEntry {
    /// Create a regular file entry
    pub fn file(destination: Utf8PathBuf, source: PathBuf) -> Self {
        Self {
            destination,
            source,
            renamed_from: None,
            kind: EntryKind::File,
        }
    }

    /// Create a directory marker entry
    pub fn directory(destination: Utf8PathBuf, source: PathBuf) -> Self {
        Self {
            destination,
            source,
            renamed_from: None,
            kind: EntryKind::Directory,
        }
    }

    /// Record the pre-rename destination
    pub fn with_renamed_from(mut self, original: Utf8PathBuf) -> Self {
        self.renamed_from = Some(original);
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
