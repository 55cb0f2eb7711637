//! Configuration management

mod cli;
mod layout;

pub use cli::{Cli, Command, ResolveArgs};
pub use layout::{ContentSpec, Layout, RenameSpec, Settings};

use crate::types::{DuplicatesStrategy, SpecError};
use std::time::Duration;

/// Default per-provider evaluation limit
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(300);

/// Resolution and staging options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of providers evaluated at once
    pub workers: usize,

    /// Limit for a single provider evaluation (None = wait forever)
    pub provider_timeout: Option<Duration>,

    /// What to do when two entries share a destination
    pub duplicates: DuplicatesStrategy,

    /// Re-hash every staged file against its source
    pub verify: bool,

    /// Show a progress bar while staging
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 4,
            provider_timeout: Some(DEFAULT_PROVIDER_TIMEOUT),
            duplicates: DuplicatesStrategy::default(),
            verify: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// Apply the `[settings]` table of a layout file
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        if let Some(duplicates) = settings.duplicates {
            self.duplicates = duplicates;
        }
        if let Some(workers) = settings.workers {
            self.workers = workers;
        }
        if let Some(secs) = settings.timeout_secs {
            self.provider_timeout = timeout_from_secs(secs);
        }
        self
    }

    /// Apply command-line overrides; they win over layout settings
    pub fn with_overrides(mut self, args: &ResolveArgs) -> Self {
        if let Some(duplicates) = args.duplicates {
            self.duplicates = duplicates;
        }
        if let Some(workers) = args.workers {
            self.workers = workers;
        }
        if let Some(secs) = args.timeout_secs {
            self.provider_timeout = timeout_from_secs(secs);
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.workers == 0 {
            return Err(SpecError::Config(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `0` disables the timeout
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
