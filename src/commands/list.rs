//! `warpack list`: print the resolved entry sequence

use super::load_layout;
use crate::config::ResolveArgs;
use crate::types::{ResolvedEntry, SpecError};
use std::path::Path;

/// Resolve `layout_path` and print one line per entry
pub fn run(layout_path: &Path, json: bool, args: &ResolveArgs) -> Result<(), SpecError> {
    let (war, config) = load_layout(layout_path, args)?;
    let entries = war.resolve(&config)?;
    let output = format_entries(&entries, json)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

fn format_entries(entries: &[ResolvedEntry], json: bool) -> Result<String, SpecError> {
    let lines = entries
        .iter()
        .map(|entry| {
            if json {
                serde_json::to_string(entry)
                    .map_err(|e| SpecError::Config(format!("cannot encode entry: {}", e)))
            } else {
                Ok(format_line(entry))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn format_line(entry: &ResolvedEntry) -> String {
    let marker = if entry.is_directory() { "/" } else { "" };
    match &entry.renamed_from {
        Some(original) => format!(
            "{}{} <- {} (renamed from {})",
            entry.destination,
            marker,
            entry.source.display(),
            original
        ),
        None => format!(
            "{}{} <- {}",
            entry.destination,
            marker,
            entry.source.display()
        ),
    }
}
