//! Progress reporting

use crate::executor::StageStats;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::time::Instant;

/// Progress reporter for resolution and staging
pub struct ProgressReporter {
    resolve_bar: ProgressBar,
    stage_bar: ProgressBar,
    stage_started_at: Option<Instant>,
    staged_bytes: u64,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let resolve_bar = ProgressBar::new_spinner();
        resolve_bar.enable_steady_tick(std::time::Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            resolve_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        let stage_bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} entries | {msg}")
        {
            stage_bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            resolve_bar,
            stage_bar,
            stage_started_at: None,
            staged_bytes: 0,
        }
    }

    /// Reporter that draws nothing (`--no-progress`)
    pub fn hidden() -> Self {
        Self {
            resolve_bar: ProgressBar::hidden(),
            stage_bar: ProgressBar::hidden(),
            stage_started_at: None,
            staged_bytes: 0,
        }
    }

    /// Mark start of the resolution phase.
    pub fn start_resolve(&self, layout: &str) {
        self.resolve_bar
            .set_message(format!("Resolving {}...", layout));
    }

    /// Mark completion of the resolution phase.
    pub fn finish_resolve(&self, entries: usize) {
        self.resolve_bar
            .finish_with_message(format!("Resolved {} entries", entries));
    }

    /// Initialize staging phase progress.
    pub fn start_stage(&mut self, total_entries: u64) {
        self.stage_started_at = Some(Instant::now());
        self.staged_bytes = 0;
        self.stage_bar.set_length(total_entries);
        self.stage_bar.set_position(0);
        self.stage_bar.set_message("Starting...".to_string());
    }

    /// Update current entry indicator.
    pub fn set_current_entry(&self, destination: &str) {
        self.stage_bar.set_message(destination.to_string());
    }

    /// Mark one entry complete and refresh throughput display.
    pub fn complete_entry(&mut self, bytes: u64) {
        self.staged_bytes = self.staged_bytes.saturating_add(bytes);
        self.stage_bar.inc(1);

        let throughput = self.current_throughput_bps();
        self.stage_bar.set_message(format!(
            "{} staged | {}/s",
            HumanBytes(self.staged_bytes),
            HumanBytes(throughput)
        ));
    }

    /// Finalize staging phase.
    pub fn finish_stage(&self, stats: &StageStats) {
        self.stage_bar.finish_with_message(format!(
            "Staged {} files, {} directories | {} total | {} verified",
            stats.files_copied,
            stats.directories_created,
            HumanBytes(stats.bytes_copied),
            stats.files_verified
        ));
    }

    fn current_throughput_bps(&self) -> u64 {
        match self.stage_started_at {
            Some(started) => {
                let secs = started.elapsed().as_secs_f64();
                if secs > 0.0 {
                    (self.staged_bytes as f64 / secs) as u64
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_stage_progress_increments_position_and_bytes() {
        let mut reporter = ProgressReporter::hidden();
        reporter.start_stage(2);

        reporter.complete_entry(128);
        reporter.complete_entry(256);

        assert_eq!(reporter.stage_bar.position(), 2);
        assert_eq!(reporter.stage_bar.length(), Some(2));
        assert_eq!(reporter.staged_bytes, 384);
    }

    #[test]
    fn test_current_entry_indicator_updates_message() {
        let reporter = ProgressReporter::hidden();
        reporter.set_current_entry("WEB-INF/lib/common.jar");
        assert!(reporter.stage_bar.message().contains("WEB-INF/lib/common.jar"));
    }

    #[test]
    fn test_throughput_becomes_non_zero_after_stage_time() {
        let mut reporter = ProgressReporter::hidden();
        reporter.start_stage(1);
        thread::sleep(Duration::from_millis(30));
        reporter.complete_entry(1024);

        assert!(reporter.current_throughput_bps() > 0);
    }

    #[test]
    fn test_finish_stage_reports_totals() {
        let reporter = ProgressReporter::hidden();
        reporter.start_resolve("layout.toml");
        reporter.finish_resolve(3);
        reporter.finish_stage(&StageStats {
            total_entries: 3,
            files_copied: 2,
            directories_created: 1,
            bytes_copied: 2048,
            files_verified: 2,
        });
        assert!(reporter.stage_bar.message().contains("2 files, 1 directories"));
    }
}
