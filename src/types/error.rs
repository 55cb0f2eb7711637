//! Error types for warpack

use std::path::PathBuf;
use thiserror::Error;

/// Error types for specification building, resolution and staging
#[derive(Debug, Error)]
pub enum SpecError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anchor passed to an insert call is not a current child of the parent
    #[error("Invalid anchor: {anchor} is not a child of {parent}")]
    InvalidAnchor { anchor: String, parent: String },

    /// Destination path is absolute, empty or escapes its spec's subtree
    #[error("Invalid path '{path}' in spec {spec}: {reason}")]
    InvalidPath {
        path: String,
        spec: String,
        reason: String,
    },

    /// Include/exclude glob failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A provider (or an upstream output it depends on) failed, timed out or was cancelled
    #[error("Source unavailable: {provider}: {reason}")]
    SourceUnavailable { provider: String, reason: String },

    /// Two entries target the same destination under the fail policy
    #[error("Duplicate entry {destination}: {first} conflicts with {second}")]
    DuplicateEntry {
        destination: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Staged copy does not hash to its source
    #[error("Checksum mismatch: {path}")]
    ChecksumMismatch { path: PathBuf },
}

impl SpecError {
    /// Shorthand for a provider failure.
    pub fn source_unavailable(provider: impl Into<String>, reason: impl ToString) -> Self {
        SpecError::SourceUnavailable {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error is raised while building the tree
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SpecError::Config(_) | SpecError::InvalidAnchor { .. } | SpecError::InvalidPattern { .. }
        )
    }

    /// Check if this error aborts a resolution pass
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            SpecError::InvalidPath { .. }
                | SpecError::SourceUnavailable { .. }
                | SpecError::DuplicateEntry { .. }
        )
    }
}
