//! Atomic file copy implementation

use crate::types::SpecError;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Write to a sibling `<name>.part` file
/// 2. Flush and sync to disk
/// 3. Preserve metadata (permissions, mtime)
/// 4. Atomic rename to final destination
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(SpecError)` - IO error or other failure
///
/// # Example
/// ```no_run
/// use warpack::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("web.xml"), Path::new("out/WEB-INF/web.xml"))?;
/// # Ok::<(), warpack::types::SpecError>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, SpecError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(SpecError::Io)?;
    }

    let part_path = part_path_for(dest);

    let mut src_file = File::open(src).map_err(SpecError::Io)?;
    let mut part_file = File::create(&part_path).map_err(SpecError::Io)?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file.read(&mut buffer).map_err(SpecError::Io)?;

        if bytes_read == 0 {
            break;
        }

        part_file
            .write_all(&buffer[0..bytes_read])
            .map_err(SpecError::Io)?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all().map_err(SpecError::Io)?;

    // Drop the file handle before rename (required on Windows)
    drop(part_file);

    let src_metadata = fs::metadata(src).map_err(SpecError::Io)?;
    fs::set_permissions(&part_path, src_metadata.permissions()).map_err(SpecError::Io)?;

    let mtime = src_metadata.modified().map_err(SpecError::Io)?;
    let filetime_mtime = filetime::FileTime::from_system_time(mtime);
    filetime::set_file_mtime(&part_path, filetime_mtime).map_err(SpecError::Io)?;

    fs::rename(&part_path, dest).map_err(SpecError::Io)?;

    Ok(total_bytes)
}

fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("entry"));
    name.push(".part");
    dest.with_file_name(name)
}
