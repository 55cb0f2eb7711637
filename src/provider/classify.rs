//! Directory / regular-file classification
//!
//! Classification follows symlinks and never fails: anything that cannot be
//! stat'ed (vanished, dangling link, permission denied) or is neither a
//! directory nor a regular file is `Excluded`.

use super::{FileHandle, FileSet};
use std::fs;
use std::path::Path;

/// Physical kind of a provider entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Directory,
    RegularFile,
    Excluded,
}

/// Classify a path on disk
pub fn classify(path: &Path) -> FileClass {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => FileClass::Directory,
        Ok(metadata) if metadata.is_file() => FileClass::RegularFile,
        _ => FileClass::Excluded,
    }
}

pub fn is_directory(path: &Path) -> bool {
    classify(path) == FileClass::Directory
}

pub fn is_regular_file(path: &Path) -> bool {
    classify(path) == FileClass::RegularFile
}

/// Split a file set into (directories, regular files), dropping excluded handles
pub fn partition(files: &FileSet) -> (FileSet, FileSet) {
    let mut dirs = FileSet::new();
    let mut regular = FileSet::new();
    for handle in files.iter() {
        match classify(handle.path()) {
            FileClass::Directory => {
                dirs.insert(handle.clone());
            }
            FileClass::RegularFile => {
                regular.insert(handle.clone());
            }
            FileClass::Excluded => {}
        }
    }
    (dirs, regular)
}

impl FileHandle {
    pub fn class(&self) -> FileClass {
        classify(self.path())
    }
}
