//! Archive path helpers
//!
//! Archive paths are relative, UTF-8 and always `/`-separated regardless of
//! the host platform, so they are assembled from components rather than
//! with `PathBuf::push`.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::path::{Component, Path};

/// Validate a destination subpath given to `subdir`.
///
/// `.` segments are dropped. `..`, absolute paths and drive prefixes are
/// rejected outright: a spec prefix may never point outside the archive.
pub fn parse_subpath(raw: &str) -> Result<Utf8PathBuf, &'static str> {
    let mut parts: Vec<&str> = Vec::new();
    for component in Utf8Path::new(raw).components() {
        match component {
            Utf8Component::Normal(part) => parts.push(part),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => return Err("must not contain '..'"),
            Utf8Component::RootDir | Utf8Component::Prefix(_) => return Err("must be relative"),
        }
    }
    Ok(Utf8PathBuf::from(parts.join("/")))
}

/// Lexically normalise the output of a rename rule.
///
/// `..` may step back inside the path but never above its start.
pub fn normalize_relative(path: &Utf8Path) -> Result<Utf8PathBuf, &'static str> {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::Normal(part) => parts.push(part),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err("escapes the spec's destination");
                }
            }
            Utf8Component::RootDir | Utf8Component::Prefix(_) => return Err("must be relative"),
        }
    }
    if parts.is_empty() {
        return Err("resolves to an empty path");
    }
    Ok(Utf8PathBuf::from(parts.join("/")))
}

/// Convert a relative host path into an archive path.
///
/// Returns `None` for non-UTF-8 names or anything that is not a plain
/// relative path.
pub fn to_archive_path(path: &Path) -> Option<Utf8PathBuf> {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(Utf8PathBuf::from(parts.join("/")))
}

/// Join two archive paths, either of which may be empty.
pub fn join_archive(prefix: &Utf8Path, rest: &Utf8Path) -> Utf8PathBuf {
    match (prefix.as_str().is_empty(), rest.as_str().is_empty()) {
        (true, _) => rest.to_path_buf(),
        (false, true) => prefix.to_path_buf(),
        (false, false) => Utf8PathBuf::from(format!("{}/{}", prefix, rest)),
    }
}
