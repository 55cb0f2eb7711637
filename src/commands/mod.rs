//! Command implementations behind the CLI

pub mod list;
pub mod stage;

use crate::config::{Config, Layout, ResolveArgs};
use crate::types::SpecError;
use crate::war::WarSpec;
use std::io::ErrorKind;
use std::path::Path;

/// Load a layout file and the effective configuration for it
///
/// Precedence: built-in defaults, then `[settings]`, then CLI flags.
pub(crate) fn load_layout(
    layout_path: &Path,
    args: &ResolveArgs,
) -> Result<(WarSpec, Config), SpecError> {
    let layout = Layout::load(layout_path)?;
    let config = Config::default()
        .with_settings(&layout.settings)
        .with_overrides(args);
    config.validate()?;

    let war = layout.build()?;
    tracing::debug!(
        layout = %layout_path.display(),
        nodes = war.root().len(),
        workers = config.workers,
        duplicates = config.duplicates.as_str(),
        "layout loaded"
    );
    Ok((war, config))
}

/// Plain-English hint for an error, if there is a useful one
pub fn suggestion(error: &SpecError) -> Option<&'static str> {
    match error {
        SpecError::Io(io) => match io.kind() {
            ErrorKind::NotFound => Some("Verify the path still exists and retry."),
            ErrorKind::PermissionDenied => {
                Some("Check file permissions or run with a user that has access.")
            }
            ErrorKind::AlreadyExists => {
                Some("Remove or rename the conflicting path in the output directory, then retry.")
            }
            _ => None,
        },
        SpecError::Config(_) => Some("Check the layout file and command-line flags."),
        SpecError::InvalidAnchor { .. } => None,
        SpecError::InvalidPath { .. } => {
            Some("Destinations must stay relative; check `into` values and rename rules.")
        }
        SpecError::InvalidPattern { .. } => {
            Some("Check the glob syntax of include/exclude patterns.")
        }
        SpecError::SourceUnavailable { .. } => {
            Some("Make sure the step producing this input ran, or raise --timeout-secs.")
        }
        SpecError::DuplicateEntry { .. } => {
            Some("Pick another policy with --duplicates, or exclude one of the sources.")
        }
        SpecError::ChecksumMismatch { .. } => {
            Some("A source changed while staging; re-run the stage command.")
        }
    }
}
