//! Staging writer: materialise resolved entries into a directory

use super::copy::copy_file_atomic;
use crate::hash::verify_copy;
use crate::types::{EntryKind, ResolvedEntry, SpecError};
use crate::Config;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::path::{Path, PathBuf};

/// Totals for one staging run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Number of entries handed to the writer.
    pub total_entries: usize,
    /// Files copied into the output directory.
    pub files_copied: usize,
    /// Directory markers created.
    pub directories_created: usize,
    /// Aggregate copied bytes.
    pub bytes_copied: u64,
    /// Files whose copy was re-hashed against the source.
    pub files_verified: usize,
}

/// Events emitted while staging.
#[derive(Debug)]
pub enum StageEvent {
    /// Entry staging started.
    EntryStart {
        index: usize,
        total: usize,
        destination: Utf8PathBuf,
        kind: EntryKind,
    },
    /// Entry staged (and verified, when enabled).
    EntryDone {
        index: usize,
        total: usize,
        destination: Utf8PathBuf,
        bytes_copied: u64,
    },
    /// Every entry staged.
    Complete { stats: StageStats },
}

/// Optional callback used to receive staging events.
pub type StageCallback = dyn Fn(&StageEvent) + Send + Sync;

/// Write `entries` below `dest_dir` in order
///
/// Stops at the first failure; entries already written are left in place.
pub fn stage_entries(
    entries: &[ResolvedEntry],
    dest_dir: &Path,
    config: &Config,
    on_event: Option<&StageCallback>,
) -> Result<StageStats, SpecError> {
    fs::create_dir_all(dest_dir).map_err(SpecError::Io)?;

    let mut stats = StageStats {
        total_entries: entries.len(),
        ..Default::default()
    };

    for (idx, entry) in entries.iter().enumerate() {
        let index = idx + 1;
        emit_event(
            on_event,
            StageEvent::EntryStart {
                index,
                total: stats.total_entries,
                destination: entry.destination.clone(),
                kind: entry.kind,
            },
        );

        let target = host_path(dest_dir, &entry.destination);
        let bytes = match entry.kind {
            EntryKind::Directory => {
                fs::create_dir_all(&target).map_err(SpecError::Io)?;
                stats.directories_created += 1;
                0
            }
            EntryKind::File => {
                let bytes = copy_file_atomic(&entry.source, &target)?;
                stats.files_copied += 1;
                stats.bytes_copied += bytes;
                if config.verify {
                    verify_copy(&entry.source, &target)?;
                    stats.files_verified += 1;
                }
                bytes
            }
        };

        tracing::debug!(
            destination = %entry.destination,
            source = %entry.source.display(),
            bytes,
            "entry staged"
        );
        emit_event(
            on_event,
            StageEvent::EntryDone {
                index,
                total: stats.total_entries,
                destination: entry.destination.clone(),
                bytes_copied: bytes,
            },
        );
    }

    emit_event(
        on_event,
        StageEvent::Complete {
            stats: stats.clone(),
        },
    );
    Ok(stats)
}

/// Archive paths are `/`-separated; rebuild them with host separators.
fn host_path(dest_dir: &Path, destination: &Utf8Path) -> PathBuf {
    destination
        .components()
        .fold(dest_dir.to_path_buf(), |path, component| {
            path.join(component.as_str())
        })
}

fn emit_event(on_event: Option<&StageCallback>, event: StageEvent) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn source(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("write source");
        path
    }

    #[test]
    fn test_stage_files_and_directory_markers() {
        let src = TempDir::new().expect("create src tempdir");
        let out = TempDir::new().expect("create out tempdir");

        let entries = vec![
            ResolvedEntry::file(
                Utf8PathBuf::from("WEB-INF/lib/common.jar"),
                source(&src, "common.jar", b"jar-bytes"),
            ),
            ResolvedEntry::file(
                Utf8PathBuf::from("index.html"),
                source(&src, "index.html", b"<html/>"),
            ),
            ResolvedEntry::directory(Utf8PathBuf::from("uploads"), src.path().to_path_buf()),
        ];

        let stats = stage_entries(&entries, out.path(), &Config::default(), None).expect("stage");

        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.files_copied, 2);
        assert_eq!(stats.directories_created, 1);
        assert_eq!(stats.bytes_copied, 16);
        assert_eq!(stats.files_verified, 0);
        assert_eq!(
            fs::read(out.path().join("WEB-INF/lib/common.jar")).expect("read"),
            b"jar-bytes"
        );
        assert!(out.path().join("uploads").is_dir());
    }

    #[test]
    fn test_stage_with_verification() {
        let src = TempDir::new().expect("create src tempdir");
        let out = TempDir::new().expect("create out tempdir");
        let entries = vec![ResolvedEntry::file(
            Utf8PathBuf::from("WEB-INF/web.xml"),
            source(&src, "web-prod.xml", b"<web-app/>"),
        )];
        let config = Config {
            verify: true,
            ..Config::default()
        };

        let stats = stage_entries(&entries, out.path(), &config, None).expect("stage");
        assert_eq!(stats.files_verified, 1);
    }

    #[test]
    fn test_stage_stops_at_first_failure() {
        let src = TempDir::new().expect("create src tempdir");
        let out = TempDir::new().expect("create out tempdir");
        let entries = vec![
            ResolvedEntry::file(Utf8PathBuf::from("missing.txt"), src.path().join("missing.txt")),
            ResolvedEntry::file(
                Utf8PathBuf::from("good.txt"),
                source(&src, "good.txt", b"good"),
            ),
        ];

        let result = stage_entries(&entries, out.path(), &Config::default(), None);
        assert!(matches!(result, Err(SpecError::Io(_))));
        assert!(!out.path().join("good.txt").exists());
    }

    #[test]
    fn test_stage_emits_events() {
        let src = TempDir::new().expect("create src tempdir");
        let out = TempDir::new().expect("create out tempdir");
        let entries = vec![ResolvedEntry::file(
            Utf8PathBuf::from("app.class"),
            source(&src, "app.class", b"cafebabe"),
        )];

        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let events_ref = Arc::clone(&events);
        let callback = move |event: &StageEvent| {
            let label = match event {
                StageEvent::EntryStart { .. } => "start",
                StageEvent::EntryDone { .. } => "done",
                StageEvent::Complete { .. } => "complete",
            };
            events_ref
                .lock()
                .expect("lock events")
                .push(label.to_string());
        };

        stage_entries(&entries, out.path(), &Config::default(), Some(&callback)).expect("stage");

        let snapshot = events.lock().expect("lock events snapshot").clone();
        assert_eq!(snapshot, vec!["start", "done", "complete"]);
    }
}
