use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::RenderError;
use crate::path::RelativePath;

pub const DEFAULT_STYLESHEET_TARGET_NAME: &str = "style.css";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parsing {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything a project file can hold.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ProjectConfig {
    pub render: RenderSettings,
    pub markdown: MarkdownConfig,
    pub index: BTreeMap<String, IndexEntry>,
}

impl ProjectConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&data).map_err(|source| ConfigError::Parsing {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RenderSettings {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub delete_target_dir: bool,
}

/// Options for the Markdown engine. Immutable for the duration of a pass.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Markdown extensions to enable. Unknown names are ignored.
    pub extensions: Vec<String>,
    /// Tera template with `stylesheet`, `title`, `html` and `tags` bindings.
    /// The built-in template is used when unset.
    pub html_template: Option<PathBuf>,
    /// CSS installed into every build. The built-in stylesheet is used when unset.
    pub stylesheet: Option<PathBuf>,
    pub stylesheet_target_name: String,
    /// Fallback page title.
    pub title: Option<String>,
    /// Write `.md` sources out as `.html` files.
    pub rewrite_md_extensions: bool,
    /// Point relative `.md` links at `.html` instead.
    pub rewrite_md_urls: bool,
    pub pretty_html: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            html_template: None,
            stylesheet: None,
            stylesheet_target_name: DEFAULT_STYLESHEET_TARGET_NAME.to_string(),
            title: None,
            rewrite_md_extensions: false,
            rewrite_md_urls: false,
            pretty_html: false,
        }
    }
}

impl MarkdownConfig {
    pub fn validate(&self) -> Result<(), RenderError> {
        let name = self.stylesheet_target_name.as_str();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name == "." || name == ".." {
            Some("must name a file")
        } else if name.contains(['/', '\\']) {
            Some("must be a file name, not a path")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(RenderError::InvalidConfig {
                key: "stylesheet_target_name".to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Per-file metadata overriding engine defaults.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct IndexEntry {
    pub title: Option<String>,
    pub tags: Vec<String>,
}

/// Metadata keyed by source-relative path.
#[derive(Debug, Default, Clone)]
pub struct PageIndex {
    entries: BTreeMap<String, IndexEntry>,
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys are normalized, so `./docs//intro.md` and `docs/intro.md` refer to
    /// the same page.
    pub fn insert(&mut self, path: &str, entry: IndexEntry) -> Result<(), RenderError> {
        let key = RelativePath::parse(path)?.to_string();
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn get(&self, path: &RelativePath) -> Option<&IndexEntry> {
        self.entries.get(&path.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, IndexEntry>> for PageIndex {
    type Error = RenderError;

    fn try_from(entries: BTreeMap<String, IndexEntry>) -> Result<Self, Self::Error> {
        let mut index = PageIndex::new();
        for (path, entry) in entries {
            index.insert(&path, entry)?;
        }
        Ok(index)
    }
}
