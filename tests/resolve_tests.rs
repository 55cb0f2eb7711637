//! Resolution behaviour of hand-built specification trees.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use warpack::executor::CancelHandle;
use warpack::provider::{is_directory, is_regular_file, partition, FnProvider};
use warpack::{
    resolve, resolve_cancellable, Classpath, Config, DuplicatesStrategy, FileSet, ResolvedEntry,
    RootSpec, SpecError,
};

fn write(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write test file");
    path.to_path_buf()
}

fn destinations(entries: &[ResolvedEntry]) -> Vec<String> {
    entries.iter().map(|e| e.destination.to_string()).collect()
}

fn config_with(duplicates: DuplicatesStrategy) -> Config {
    Config {
        duplicates,
        ..Config::default()
    }
}

#[test]
fn test_web_inf_ordering_scenario() {
    let temp = TempDir::new().expect("create temp dir");
    let classes = temp.path().join("classes");
    write(&classes.join("util.class"), b"util");
    let jar = write(&temp.path().join("common.jar"), b"jar");
    let app = write(&temp.path().join("app.class"), b"app");

    let mut root = RootSpec::new();
    root.main_spec_mut().from_paths([app]);
    {
        let mut before = root.add_child_before_main();
        before
            .subdir("WEB-INF/classes")
            .expect("classes subdir")
            .from_paths([classes]);
    }
    {
        let mut before = root.add_child_before_main();
        before
            .subdir("WEB-INF/lib")
            .expect("lib subdir")
            .from_paths([jar]);
    }

    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(
        destinations(&entries),
        vec!["WEB-INF/classes/util.class", "WEB-INF/lib/common.jar", "app.class"]
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let temp = TempDir::new().expect("create temp dir");
    let site = temp.path().join("site");
    for name in ["b.html", "a.html", "css/z.css", "css/a.css", "js/app.js"] {
        write(&site.join(name), name.as_bytes());
    }

    let mut root = RootSpec::new();
    root.main_spec_mut().from_paths([site.clone()]);
    root.add_child_after_main().from_paths([site]);
    let config = Config {
        workers: 8,
        duplicates: DuplicatesStrategy::Include,
        ..Config::default()
    };

    let first = resolve(&root, &config).expect("first resolve");
    for _ in 0..5 {
        assert_eq!(resolve(&root, &config).expect("resolve again"), first);
    }
    assert_eq!(
        destinations(&first)[..5],
        ["a.html", "b.html", "css/a.css", "css/z.css", "js/app.js"]
    );
}

#[test]
fn test_classification_partitions_without_overlap() {
    let temp = TempDir::new().expect("create temp dir");
    let dir = temp.path().join("classes");
    fs::create_dir(&dir).expect("create dir");
    let file = write(&temp.path().join("a.jar"), b"jar");
    let gone = temp.path().join("deleted.jar");

    let files: FileSet = [dir.clone(), file.clone(), gone.clone()].into_iter().collect();
    let (dirs, regular) = partition(&files);

    assert_eq!(dirs.paths().collect::<Vec<_>>(), vec![dir.as_path()]);
    assert_eq!(regular.paths().collect::<Vec<_>>(), vec![file.as_path()]);
    assert!(!is_directory(&gone) && !is_regular_file(&gone));
}

#[test]
fn test_before_and_after_groups_keep_insertion_order() {
    let temp = TempDir::new().expect("create temp dir");
    let mk = |name: &str| write(&temp.path().join(name), name.as_bytes());

    let mut root = RootSpec::new();
    root.add_child_after_main().from_paths([mk("after1.txt")]);
    root.add_child_before_main().from_paths([mk("before1.txt")]);
    root.main_spec_mut().from_paths([mk("main.txt")]);
    root.add_child_after_main().from_paths([mk("after2.txt")]);
    root.add_child_before_main().from_paths([mk("before2.txt")]);

    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(
        destinations(&entries),
        vec!["before1.txt", "before2.txt", "main.txt", "after1.txt", "after2.txt"]
    );
}

#[test]
fn test_repeated_subdir_merges_providers() {
    let temp = TempDir::new().expect("create temp dir");
    let a = write(&temp.path().join("a.jar"), b"a");
    let b = write(&temp.path().join("b.jar"), b"b");

    let mut root = RootSpec::new();
    let mut main = root.main_spec_mut();
    let first = main.subdir("lib").expect("subdir").from_paths([a]).id();
    let second = main.subdir("lib").expect("subdir").from_paths([b]).id();
    assert_eq!(first, second);

    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["lib/a.jar", "lib/b.jar"]);
}

#[test]
fn test_last_write_wins_by_default() {
    let temp = TempDir::new().expect("create temp dir");
    let generated = write(&temp.path().join("gen/web.xml"), b"generated");
    let custom = write(&temp.path().join("custom/web.xml"), b"custom");

    let mut root = RootSpec::new();
    root.main_spec_mut().from_paths([generated]);
    root.add_child_after_main().from_paths([custom.clone()]);

    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, custom);
}

#[test]
fn test_fail_policy_names_both_sources() {
    let temp = TempDir::new().expect("create temp dir");
    let generated = write(&temp.path().join("gen/web.xml"), b"generated");
    let custom = write(&temp.path().join("custom/web.xml"), b"custom");

    let mut root = RootSpec::new();
    root.main_spec_mut().from_paths([generated.clone()]);
    root.add_child_after_main().from_paths([custom.clone()]);

    let err = resolve(&root, &config_with(DuplicatesStrategy::Fail)).expect_err("should fail");
    match err {
        SpecError::DuplicateEntry {
            destination,
            first,
            second,
        } => {
            assert_eq!(destination, "web.xml");
            assert_eq!(first, generated);
            assert_eq!(second, custom);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_first_policy_keeps_earlier_source() {
    let temp = TempDir::new().expect("create temp dir");
    let generated = write(&temp.path().join("gen/web.xml"), b"generated");
    let custom = write(&temp.path().join("custom/web.xml"), b"custom");

    let mut root = RootSpec::new();
    root.main_spec_mut().from_paths([generated.clone()]);
    root.add_child_after_main().from_paths([custom]);

    let entries = resolve(&root, &config_with(DuplicatesStrategy::First)).expect("resolve");
    assert_eq!(entries[0].source, generated);
}

#[test]
fn test_rename_rules_compose_in_registration_order() {
    let temp = TempDir::new().expect("create temp dir");
    let site = temp.path().join("site");
    write(&site.join("v1/index.html"), b"<html/>");

    let mut root = RootSpec::new();
    root.main_spec_mut()
        .from_paths([site])
        .rename(|path| {
            path.strip_prefix("v1")
                .map(Utf8Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf())
        })
        .rename(|path| Utf8PathBuf::from(format!("{}.orig", path)));

    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["index.html.orig"]);
    assert_eq!(
        entries[0].renamed_from.as_deref(),
        Some(Utf8Path::new("v1/index.html"))
    );
}

#[test]
fn test_fixed_name_rename_yields_single_entry() {
    let temp = TempDir::new().expect("create temp dir");
    let descriptor = write(&temp.path().join("web-prod.xml"), b"<web-app/>");

    let mut root = RootSpec::new();
    root.main_spec_mut()
        .subdir("WEB-INF")
        .expect("subdir")
        .from_paths([descriptor.clone()])
        .rename(|_| Utf8PathBuf::from("web.xml"));

    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["WEB-INF/web.xml"]);
    assert_eq!(entries[0].source, descriptor);
}

#[test]
fn test_empty_classpath_resolves_to_zero_entries() {
    let classpath = Classpath::new();
    let mut root = RootSpec::new();
    root.main_spec_mut()
        .subdir("WEB-INF/lib")
        .expect("subdir")
        .from(classpath);

    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert!(entries.is_empty());
}

#[test]
fn test_providers_are_evaluated_at_resolution_time() {
    let temp = TempDir::new().expect("create temp dir");
    let calls = Arc::new(AtomicUsize::new(0));
    let output = temp.path().join("build/app.jar");

    let mut root = RootSpec::new();
    let counter = Arc::clone(&calls);
    let produced = output.clone();
    root.main_spec_mut().from_fn("jar task", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok([produced.clone()].into_iter().collect())
    });
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    write(&output, b"jar");
    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["app.jar"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    resolve(&root, &Config::default()).expect("resolve again");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_include_and_exclude_patterns() {
    let temp = TempDir::new().expect("create temp dir");
    let classes = temp.path().join("classes");
    write(&classes.join("com/acme/App.class"), b"app");
    write(&classes.join("com/acme/App.java"), b"src");
    write(&classes.join("com/acme/internal/Hidden.class"), b"hidden");

    let mut root = RootSpec::new();
    root.main_spec_mut()
        .from_paths([classes])
        .include("**/*.class")
        .expect("include")
        .exclude("**/internal/**")
        .expect("exclude");

    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["com/acme/App.class"]);
}

#[test]
fn test_include_all_keeps_every_duplicate() {
    let temp = TempDir::new().expect("create temp dir");
    let a = write(&temp.path().join("one/common.jar"), b"1");
    let b = write(&temp.path().join("two/common.jar"), b"2");

    let mut root = RootSpec::new();
    root.main_spec_mut()
        .subdir("lib")
        .expect("subdir")
        .from_paths([a, b]);

    let entries = resolve(&root, &config_with(DuplicatesStrategy::Include)).expect("resolve");
    assert_eq!(destinations(&entries), vec!["lib/common.jar", "lib/common~1.jar"]);
}

#[test]
fn test_empty_directories_need_opt_in() {
    let temp = TempDir::new().expect("create temp dir");
    let site = temp.path().join("site");
    write(&site.join("index.html"), b"<html/>");
    fs::create_dir_all(site.join("uploads")).expect("create empty dir");

    let mut root = RootSpec::new();
    root.main_spec_mut().from_paths([site.clone()]);
    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["index.html"]);

    let mut root = RootSpec::new();
    root.main_spec_mut()
        .from_paths([site])
        .include_empty_dirs(true);
    let entries = resolve(&root, &Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["index.html", "uploads"]);
    assert!(entries[1].is_directory());
}

#[test]
fn test_rename_escaping_subtree_is_rejected() {
    let temp = TempDir::new().expect("create temp dir");
    let file = write(&temp.path().join("a.txt"), b"a");

    let mut root = RootSpec::new();
    root.main_spec_mut()
        .subdir("docs")
        .expect("subdir")
        .from_paths([file])
        .rename(|_| Utf8PathBuf::from("../../etc/passwd"));

    let err = resolve(&root, &Config::default()).expect_err("should fail");
    assert!(matches!(err, SpecError::InvalidPath { .. }));
    assert!(err.to_string().contains("docs"));
}

#[test]
fn test_provider_failure_aborts_resolution() {
    let mut root = RootSpec::new();
    root.main_spec_mut()
        .from_paths(["/does/not/matter.txt"])
        .from(FnProvider::new("compileJava output", || {
            Err(SpecError::source_unavailable("compileJava output", "task failed"))
        }));

    let err = resolve(&root, &Config::default()).expect_err("should fail");
    match err {
        SpecError::SourceUnavailable { provider, .. } => assert_eq!(provider, "compileJava output"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_stalled_provider_times_out() {
    let mut root = RootSpec::new();
    root.main_spec_mut().from_fn("remote fetch", || {
        thread::sleep(Duration::from_secs(2));
        Ok(FileSet::new())
    });
    let config = Config {
        provider_timeout: Some(Duration::from_millis(50)),
        ..Config::default()
    };

    let err = resolve(&root, &config).expect_err("should time out");
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn test_cancelled_resolution_fails() {
    let cancel = CancelHandle::new();
    let mut root = RootSpec::new();
    let trigger = cancel.clone();
    root.main_spec_mut().from_fn("slow", move || {
        trigger.cancel();
        thread::sleep(Duration::from_millis(300));
        Ok(FileSet::new())
    });

    let err = resolve_cancellable(&root, &Config::default(), &cancel).expect_err("cancelled");
    assert!(matches!(err, SpecError::SourceUnavailable { .. }));
    assert!(err.to_string().contains("cancelled"));
}

#[test]
fn test_declared_inputs_are_static() {
    let mut root = RootSpec::new();
    root.main_spec_mut()
        .from_paths(["/src/webapp", "/src/extra"])
        .from(FnProvider::new("generated", || Ok(FileSet::new()))
            .with_declared_inputs(vec![PathBuf::from("/build/gen")]));

    assert_eq!(
        root.declared_inputs(),
        vec![
            PathBuf::from("/src/webapp"),
            PathBuf::from("/src/extra"),
            PathBuf::from("/build/gen"),
        ]
    );
}
