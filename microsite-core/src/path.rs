//! Root-relative file paths.
//!
//! A [`RelativePath`] is stored as an ordered list of segments, so joining it
//! onto a root never depends on the platform separator and can't pick up a
//! doubled root prefix.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::RenderError;

pub const MARKDOWN_EXTENSION: &str = "md";
pub const HTML_EXTENSION: &str = "html";

/// Characters `parse` splits on. Matches what `Path::components` treats as a
/// separator on the host, so parsed and scanned paths compare equal.
#[cfg(windows)]
const SEPARATORS: &[char] = &['/', '\\'];
#[cfg(not(windows))]
const SEPARATORS: &[char] = &['/'];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    /// Builds a path from a string using `/` as the separator (and `\` on
    /// Windows).
    ///
    /// Empty segments and `.` are skipped. `..` is rejected.
    pub fn parse(path: &str) -> Result<Self, RenderError> {
        let mut segments = Vec::new();
        for segment in path.split(SEPARATORS) {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(RenderError::InvalidPath {
                        path: PathBuf::from(path),
                    });
                }
                s => segments.push(s.to_string()),
            }
        }
        if segments.is_empty() {
            return Err(RenderError::InvalidPath {
                path: PathBuf::from(path),
            });
        }
        Ok(Self { segments })
    }

    /// Builds a path from a filesystem path that is already relative to a root.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let invalid = || RenderError::InvalidPath {
            path: path.to_path_buf(),
        };

        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => {
                    segments.push(name.to_str().ok_or_else(invalid)?.to_string());
                }
                Component::CurDir => {}
                _ => return Err(invalid()),
            }
        }
        if segments.is_empty() {
            return Err(invalid());
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn file_name(&self) -> &str {
        // Construction guarantees at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of directories between the root and this file.
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.depth()]
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.file_name()
            .strip_suffix(extension)
            .is_some_and(|stem| stem.ends_with('.'))
    }

    pub fn is_markdown(&self) -> bool {
        self.has_extension(MARKDOWN_EXTENSION)
    }

    /// Replaces the trailing extension of the file name.
    ///
    /// A file name without an extension gets `extension` appended.
    pub fn with_extension(&self, extension: &str) -> Self {
        let name = self.file_name();
        let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            *last = format!("{stem}.{extension}");
        }
        Self { segments }
    }

    /// Resolves this path under `root`.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }

    /// A reference to `target` (a root-level file name) as seen from this
    /// file's directory, e.g. `../../style.css` at depth two.
    pub fn relative_reference(&self, target: &str) -> String {
        format!("{}{}", "../".repeat(self.depth()), target)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// The full, ordered set of files found under a source root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    paths: BTreeSet<RelativePath>,
}

impl SourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: RelativePath) -> bool {
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelativePath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn as_set(&self) -> &BTreeSet<RelativePath> {
        &self.paths
    }
}

impl FromIterator<RelativePath> for SourceTree {
    fn from_iter<I: IntoIterator<Item = RelativePath>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SourceTree {
    type Item = &'a RelativePath;
    type IntoIter = std::collections::btree_set::Iter<'a, RelativePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
