//! DuplicatesStrategy - what happens when two entries share a destination

use serde::{Deserialize, Serialize};

/// Duplicate-handling policy applied while merging in traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatesStrategy {
    /// Later entry replaces the earlier one (last write wins)
    #[default]
    Replace,

    /// Earlier entry is kept, later one dropped (first write wins)
    First,

    /// Both kept, the later one under a disambiguated name
    Include,

    /// Abort with `SpecError::DuplicateEntry`
    Fail,
}

impl DuplicatesStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatesStrategy::Replace => "replace",
            DuplicatesStrategy::First => "first",
            DuplicatesStrategy::Include => "include",
            DuplicatesStrategy::Fail => "fail",
        }
    }
}
