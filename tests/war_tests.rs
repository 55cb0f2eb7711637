//! Web archive layout tests.

use camino::Utf8PathBuf;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use warpack::provider::FnProvider;
use warpack::{Config, DuplicatesStrategy, ResolvedEntry, SpecError, WarSpec};

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

/// Build output directory plus two jars, the usual web-app classpath
fn project(temp: &TempDir) -> (PathBuf, PathBuf, PathBuf) {
    let classes = temp.path().join("build/classes");
    write(&classes.join("com/acme/Servlet.class"), b"servlet");
    write(&classes.join("log4j.properties"), b"level=info");
    let common = write(&temp.path().join("libs/common.jar"), b"common");
    let extra = write(&temp.path().join("libs/extra.jar"), b"extra");
    (classes, common, extra)
}

#[test]
fn test_standard_layout() {
    let temp = TempDir::new().expect("create temp dir");
    let (classes, common, extra) = project(&temp);
    let descriptor = write(&temp.path().join("src/web-prod.xml"), b"<web-app/>");
    let webapp = temp.path().join("src/webapp");
    write(&webapp.join("index.jsp"), b"<%= 1 %>");
    write(&webapp.join("css/site.css"), b"body{}");

    let mut war = WarSpec::new();
    war.set_classpath([classes, common, extra]);
    war.set_web_xml(Some(descriptor.clone()));
    war.main_spec().from_paths([webapp]);

    let entries = war.resolve(&Config::default()).expect("resolve");
    assert_eq!(
        destinations(&entries),
        vec![
            "WEB-INF/classes/com/acme/Servlet.class",
            "WEB-INF/classes/log4j.properties",
            "WEB-INF/lib/common.jar",
            "WEB-INF/lib/extra.jar",
            "WEB-INF/web.xml",
            "css/site.css",
            "index.jsp",
        ]
    );

    let web_xml = &entries[4];
    assert_eq!(web_xml.source, descriptor);
    assert_eq!(
        web_xml.renamed_from,
        Some(Utf8PathBuf::from("WEB-INF/web-prod.xml"))
    );
}

#[test]
fn test_unset_classpath_and_descriptor_contribute_nothing() {
    let temp = TempDir::new().expect("create temp dir");
    let index = write(&temp.path().join("index.html"), b"<html/>");

    let mut war = WarSpec::new();
    war.main_spec().from_paths([index]);

    let entries = war.resolve(&Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["index.html"]);
}

#[test]
fn test_classpath_is_read_at_resolution_time() {
    let temp = TempDir::new().expect("create temp dir");
    let mut war = WarSpec::new();
    let jar = temp.path().join("build/libs/app-core.jar");
    war.add_classpath([jar.clone()]);

    // Nothing built yet.
    assert!(war.resolve(&Config::default()).expect("resolve").is_empty());

    write(&jar, b"jar");
    let entries = war.resolve(&Config::default()).expect("resolve");
    assert_eq!(destinations(&entries), vec!["WEB-INF/lib/app-core.jar"]);
}

#[test]
fn test_classpath_provider_from_another_step() {
    let temp = TempDir::new().expect("create temp dir");
    let (classes, common, _) = project(&temp);

    let mut war = WarSpec::new();
    war.add_classpath([common]);
    war.add_classpath_provider(Arc::new(FnProvider::new("compileJava", move || {
        Ok([classes.clone()].into_iter().collect())
    })));

    let entries = war.resolve(&Config::default()).expect("resolve");
    assert_eq!(
        destinations(&entries),
        vec![
            "WEB-INF/classes/com/acme/Servlet.class",
            "WEB-INF/classes/log4j.properties",
            "WEB-INF/lib/common.jar",
        ]
    );
}

#[test]
fn test_classpath_upstream_runs_once_per_resolve() {
    let temp = TempDir::new().expect("create temp dir");
    let (classes, common, _) = project(&temp);
    let calls = Arc::new(AtomicUsize::new(0));

    let mut war = WarSpec::new();
    let counter = Arc::clone(&calls);
    war.add_classpath_provider(Arc::new(FnProvider::new("compileJava", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok([classes.clone(), common.clone()].into_iter().collect())
    })));

    let entries = war.resolve(&Config::default()).expect("resolve");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(entries.len(), 3);

    war.resolve(&Config::default()).expect("resolve again");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failed_classpath_step_is_source_unavailable() {
    let mut war = WarSpec::new();
    war.add_classpath_provider(Arc::new(FnProvider::new("compileJava", || {
        Err(SpecError::source_unavailable("compileJava", "compilation failed"))
    })));

    let err = war.resolve(&Config::default()).expect_err("should fail");
    assert!(matches!(err, SpecError::SourceUnavailable { .. }));
    assert!(err.to_string().contains("compileJava"));
}

#[test]
fn test_web_inf_extra_content() {
    let temp = TempDir::new().expect("create temp dir");
    let jboss = write(&temp.path().join("src/jboss-web.xml"), b"<jboss-web/>");
    let tld = write(&temp.path().join("src/tags.tld"), b"<taglib/>");
    let descriptor = write(&temp.path().join("src/web.xml"), b"<web-app/>");

    let mut war = WarSpec::new();
    war.set_web_xml(Some(descriptor));
    war.web_inf().from_paths([jboss]);
    war.configure_web_inf(|spec| {
        spec.subdir("tags")?.from_paths([tld.clone()]);
        Ok(())
    })
    .expect("configure WEB-INF");

    let entries = war.resolve(&Config::default()).expect("resolve");
    assert_eq!(
        destinations(&entries),
        vec!["WEB-INF/web.xml", "WEB-INF/jboss-web.xml", "WEB-INF/tags/tags.tld"]
    );
}

#[test]
fn test_user_descriptor_overrides_generated_one() {
    let temp = TempDir::new().expect("create temp dir");
    let generated = write(&temp.path().join("gen/web.xml"), b"generated");
    let custom = write(&temp.path().join("custom/web.xml"), b"custom");

    let mut war = WarSpec::new();
    war.set_web_xml(Some(generated.clone()));
    war.web_inf().from_paths([custom.clone()]);

    let entries = war.resolve(&Config::default()).expect("resolve");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, custom);

    let config = Config {
        duplicates: DuplicatesStrategy::Fail,
        ..Config::default()
    };
    let err = war.resolve(&config).expect_err("should conflict");
    assert!(matches!(err, SpecError::DuplicateEntry { .. }));
}

#[test]
fn test_main_spec_content_after_web_inf() {
    let temp = TempDir::new().expect("create temp dir");
    let (_, common, _) = project(&temp);
    let readme = write(&temp.path().join("README.txt"), b"readme");
    let notice = write(&temp.path().join("NOTICE"), b"notice");

    let mut war = WarSpec::new();
    war.set_classpath([common]);
    war.main_spec().subdir("META-INF").expect("subdir").from_paths([notice]);
    war.root_mut().add_child_after_main().from_paths([readme]);
    war.root_mut()
        .add_child_before_main()
        .subdir("assets")
        .expect("subdir")
        .from_paths([temp.path().join("libs/extra.jar")]);

    let entries = war.resolve(&Config::default()).expect("resolve");
    assert_eq!(
        destinations(&entries),
        vec![
            "WEB-INF/lib/common.jar",
            "assets/extra.jar",
            "META-INF/NOTICE",
            "README.txt",
        ]
    );
}
