//! State shared by the providers of one resolution pass

use super::FileSet;
use crate::types::SpecError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// Outcome of a memoised evaluation; errors are kept as `(provider, reason)`
/// so every reader gets an identical `SourceUnavailable`.
type Outcome = Result<FileSet, (String, String)>;

/// Memo for sources that several nodes read during one `resolve` call
///
/// A fresh pass is created per call, so nothing is cached across calls.
#[derive(Default)]
pub struct ResolvePass {
    memos: Mutex<HashMap<usize, Arc<OnceLock<Outcome>>>>,
}

impl ResolvePass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `compute` at most once per `key` in this pass
    ///
    /// Concurrent callers for the same key block until the first finishes.
    pub(crate) fn once<F>(&self, key: usize, compute: F) -> Result<FileSet, SpecError>
    where
        F: FnOnce() -> Result<FileSet, SpecError>,
    {
        let memo = {
            let mut memos = self.memos.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(memos.entry(key).or_default())
        };

        let outcome = memo.get_or_init(|| {
            compute().map_err(|err| match err {
                SpecError::SourceUnavailable { provider, reason } => (provider, reason),
                other => ("classpath".to_string(), other.to_string()),
            })
        });
        match outcome {
            Ok(files) => Ok(files.clone()),
            Err((provider, reason)) => Err(SpecError::SourceUnavailable {
                provider: provider.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

impl fmt::Debug for ResolvePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let memos = self.memos.lock().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("ResolvePass").field("memos", &memos).finish()
    }
}
