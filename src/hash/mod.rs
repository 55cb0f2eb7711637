//! Content hashing for staged entry verification

use crate::types::SpecError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the Blake3 hash of a file, streamed in 64KB chunks
///
/// # Example
/// ```no_run
/// use warpack::hash::compute_hash;
/// use std::path::Path;
///
/// let hash = compute_hash(Path::new("WEB-INF/web.xml"))?;
/// # Ok::<(), warpack::types::SpecError>(())
/// ```
pub fn compute_hash(file_path: &Path) -> Result<[u8; 32], SpecError> {
    let mut file = File::open(file_path).map_err(SpecError::Io)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(SpecError::Io)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[0..bytes_read]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Check that `copy` has the same content as `original`
pub fn verify_copy(original: &Path, copy: &Path) -> Result<(), SpecError> {
    if compute_hash(original)? == compute_hash(copy)? {
        Ok(())
    } else {
        Err(SpecError::ChecksumMismatch {
            path: copy.to_path_buf(),
        })
    }
}
