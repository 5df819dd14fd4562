use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::RenderError;
use crate::path::{RelativePath, SourceTree};

/// Enumerates the regular files under a source root.
pub struct PathScanner {
    root: PathBuf,
}

impl PathScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Checks that the root exists, is a directory and can be stat'ed.
    ///
    /// Call this once before [`scan`](Self::scan); the walk itself assumes
    /// every directory it discovers is valid.
    pub fn validate(&self) -> Result<(), RenderError> {
        validate_dir(&self.root)
    }

    /// Collects every regular file under the root, relative to the root.
    ///
    /// Symbolic links are followed; links whose target is gone are skipped.
    /// Entries are visited in file name order so an unchanged tree always
    /// scans to the same set.
    pub fn scan(&self) -> Result<SourceTree, RenderError> {
        let mut tree = SourceTree::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if is_dangling_link(&err) => continue,
                Err(err) => {
                    let path = err.path().unwrap_or(&self.root).to_path_buf();
                    return Err(match err.into_io_error() {
                        Some(source) => RenderError::Io { path, source },
                        None => RenderError::invalid_directory(&path, "filesystem loop detected"),
                    });
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|_| RenderError::InvalidPath {
                    path: entry.path().to_path_buf(),
                })?;
            tree.insert(RelativePath::from_path(relative)?);
        }

        Ok(tree)
    }
}

fn is_dangling_link(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
    not_found
        && err.path().is_some_and(|path| {
            std::fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
        })
}

pub fn validate_dir(path: &Path) -> Result<(), RenderError> {
    if !path.exists() {
        return Err(RenderError::invalid_directory(path, "does not exist"));
    }
    let metadata = std::fs::metadata(path)
        .map_err(|err| RenderError::invalid_directory(path, err.to_string()))?;
    if !metadata.is_dir() {
        return Err(RenderError::invalid_directory(path, "not a directory"));
    }
    std::fs::read_dir(path).map_err(|err| RenderError::invalid_directory(path, err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, rel).unwrap();
    }

    #[test]
    fn scan_lists_files_relative_to_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.md");
        touch(dir.path(), "img/logo.png");
        touch(dir.path(), "docs/guide/setup.md");
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();

        let tree = PathScanner::new(dir.path()).scan().unwrap();
        let listed: Vec<String> = tree.iter().map(ToString::to_string).collect();

        assert_eq!(
            listed,
            vec!["docs/guide/setup.md", "img/logo.png", "index.md"]
        );
    }

    #[test]
    fn rescanning_is_stable() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.md");
        touch(dir.path(), "a/c.txt");

        let scanner = PathScanner::new(dir.path());
        assert_eq!(scanner.scan().unwrap(), scanner.scan().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_links_are_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.md");
        touch(dir.path(), "img/real.png");
        std::os::unix::fs::symlink("gone.png", dir.path().join("dangling.png")).unwrap();
        std::os::unix::fs::symlink("real.png", dir.path().join("img/alias.png")).unwrap();

        let tree = PathScanner::new(dir.path()).scan().unwrap();
        let listed: Vec<String> = tree.iter().map(ToString::to_string).collect();

        assert_eq!(listed, vec!["img/alias.png", "img/real.png", "index.md"]);
    }

    #[test]
    fn validate_rejects_missing_and_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.txt");

        let missing = PathScanner::new(dir.path().join("nope")).validate();
        assert!(matches!(missing, Err(RenderError::InvalidDirectory { .. })));

        let file = PathScanner::new(dir.path().join("file.txt")).validate();
        assert!(matches!(file, Err(RenderError::InvalidDirectory { .. })));

        assert!(PathScanner::new(dir.path()).validate().is_ok());
    }
}
