//! Layout files: a web archive described in TOML
//!
//! ```toml
//! classpath = ["build/classes", "libs/common.jar"]
//! web_xml = "src/web-prod.xml"
//!
//! [settings]
//! duplicates = "fail"
//!
//! [[content]]
//! from = ["src/webapp"]
//! exclude = ["**/*.bak"]
//!
//! [[web_inf]]
//! from = ["src/jboss-web.xml"]
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use crate::spec::SpecMut;
use crate::types::{DuplicatesStrategy, SpecError};
use crate::war::WarSpec;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// `[settings]` table; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub duplicates: Option<DuplicatesStrategy>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Path rewrite applied to the entries of one content table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenameSpec {
    /// Exact path `from` becomes `to`
    Literal { from: String, to: String },
    /// Leading directories `prefix` are removed
    StripPrefix { prefix: String },
    /// `suffix` is appended to the path
    AddSuffix { suffix: String },
}

impl RenameSpec {
    pub fn apply(&self, path: &Utf8Path) -> Utf8PathBuf {
        match self {
            RenameSpec::Literal { from, to } if path.as_str() == from => Utf8PathBuf::from(to),
            RenameSpec::Literal { .. } => path.to_path_buf(),
            RenameSpec::StripPrefix { prefix } => match path.strip_prefix(prefix) {
                Ok(rest) if !rest.as_str().is_empty() => rest.to_path_buf(),
                _ => path.to_path_buf(),
            },
            RenameSpec::AddSuffix { suffix } => Utf8PathBuf::from(format!("{}{}", path, suffix)),
        }
    }
}

/// One `[[content]]`, `[[web_inf]]`, `[[before]]` or `[[after]]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentSpec {
    #[serde(default)]
    pub from: Vec<PathBuf>,
    pub into: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub include_empty_dirs: bool,
    #[serde(default)]
    pub rename: Vec<RenameSpec>,
}

/// Parsed layout file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    pub classpath: Option<Vec<PathBuf>>,
    pub web_xml: Option<PathBuf>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub content: Vec<ContentSpec>,
    #[serde(default)]
    pub web_inf: Vec<ContentSpec>,
    #[serde(default)]
    pub before: Vec<ContentSpec>,
    #[serde(default)]
    pub after: Vec<ContentSpec>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Layout {
    /// Read and parse a layout file
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let text = fs::read_to_string(path).map_err(|e| {
            SpecError::Config(format!("cannot read layout {}: {}", path.display(), e))
        })?;
        let mut layout = Self::parse(&text)
            .map_err(|e| SpecError::Config(format!("{}: {}", path.display(), e)))?;
        layout.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(layout)
    }

    /// Parse layout text; paths stay relative to the current directory
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Build the web archive specification this layout describes
    pub fn build(&self) -> Result<WarSpec, SpecError> {
        let mut war = WarSpec::new();

        if let Some(classpath) = &self.classpath {
            war.set_classpath(classpath.iter().map(|p| self.absolute(p)));
        }
        if let Some(web_xml) = &self.web_xml {
            war.set_web_xml(Some(self.absolute(web_xml)));
        }

        for table in &self.web_inf {
            war.configure_web_inf(|spec| self.apply(spec, table))?;
        }
        for table in &self.content {
            let mut main = war.main_spec();
            self.apply(&mut main.add_child(), table)?;
        }
        for table in &self.before {
            let mut child = war.root_mut().add_child_before_main();
            self.apply(&mut child, table)?;
        }
        for table in &self.after {
            let mut child = war.root_mut().add_child_after_main();
            self.apply(&mut child, table)?;
        }

        Ok(war)
    }

    fn apply(&self, spec: &mut SpecMut<'_>, table: &ContentSpec) -> Result<(), SpecError> {
        if let Some(subpath) = table.into.as_deref() {
            let mut target = spec.subdir(subpath)?;
            self.configure(&mut target, table)?;
        } else {
            self.configure(spec, table)?;
        }
        Ok(())
    }

    fn configure(&self, spec: &mut SpecMut<'_>, table: &ContentSpec) -> Result<(), SpecError> {
        spec.from_paths(table.from.iter().map(|p| self.absolute(p)))
            .include_empty_dirs(table.include_empty_dirs);
        for pattern in &table.include {
            spec.include(pattern)?;
        }
        for pattern in &table.exclude {
            spec.exclude(pattern)?;
        }
        for rule in &table.rename {
            let rule = rule.clone();
            spec.rename(move |path| rule.apply(path));
        }
        Ok(())
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
