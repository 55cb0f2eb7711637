//! `warpack stage`: resolve a layout and write it into a directory

use super::load_layout;
use crate::config::ResolveArgs;
use crate::executor::{stage_entries, StageEvent, StageStats};
use crate::types::SpecError;
use crate::ui::ProgressReporter;
use indicatif::HumanBytes;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Run the stage operation
pub fn run(
    layout_path: &Path,
    out_dir: &Path,
    verify: bool,
    no_progress: bool,
    args: &ResolveArgs,
) -> Result<StageStats, SpecError> {
    let (war, mut config) = load_layout(layout_path, args)?;
    config.verify = verify;
    config.show_progress = !no_progress;

    let reporter = Arc::new(Mutex::new(if config.show_progress {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    }));

    if let Ok(progress) = reporter.lock() {
        progress.start_resolve(&layout_path.display().to_string());
    }
    let entries = war.resolve(&config)?;
    if let Ok(mut progress) = reporter.lock() {
        progress.finish_resolve(entries.len());
        progress.start_stage(entries.len() as u64);
    }

    let progress_cb = {
        let reporter = Arc::clone(&reporter);
        move |event: &StageEvent| match event {
            StageEvent::EntryStart { destination, .. } => {
                if let Ok(progress) = reporter.lock() {
                    progress.set_current_entry(destination.as_str());
                }
            }
            StageEvent::EntryDone { bytes_copied, .. } => {
                if let Ok(mut progress) = reporter.lock() {
                    progress.complete_entry(*bytes_copied);
                }
            }
            StageEvent::Complete { stats } => {
                if let Ok(progress) = reporter.lock() {
                    progress.finish_stage(stats);
                }
            }
        }
    };

    let stats = stage_entries(&entries, out_dir, &config, Some(&progress_cb))?;
    println!("{}", format_summary(&stats, out_dir));
    Ok(stats)
}

fn format_summary(stats: &StageStats, out_dir: &Path) -> String {
    let mut summary = format!(
        "Staged {} entries into {}: {} files, {} directories, {}",
        stats.total_entries,
        out_dir.display(),
        stats.files_copied,
        stats.directories_created,
        HumanBytes(stats.bytes_copied)
    );
    if stats.files_verified > 0 {
        summary.push_str(&format!(" ({} verified)", stats.files_verified));
    }
    summary
}
