use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::{RenderEngine, RenderedSet};
use crate::error::RenderError;
use crate::events::{EventSink, RenderEvent, default_sink};
use crate::path::RelativePath;
use crate::scanner::PathScanner;

/// What a successful pass produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderReport {
    /// Paths each engine claimed, keyed by engine name.
    pub claimed: BTreeMap<String, RenderedSet>,
    /// Paths no engine claimed, copied verbatim.
    pub copied: BTreeSet<RelativePath>,
}

impl RenderReport {
    pub fn claimed_union(&self) -> BTreeSet<RelativePath> {
        self.claimed.values().flatten().cloned().collect()
    }
}

/// Runs a set of engines over a source tree and copies whatever they leave.
pub struct RenderOrchestrator {
    engines: Vec<Box<dyn RenderEngine>>,
    delete_target_if_exists: bool,
    events: Arc<dyn EventSink>,
}

impl Default for RenderOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderOrchestrator {
    pub fn new() -> Self {
        Self {
            engines: Vec::new(),
            delete_target_if_exists: false,
            events: default_sink(),
        }
    }

    /// Registers an engine. Engines run in registration order.
    pub fn engine<E: RenderEngine + 'static>(mut self, engine: E) -> Self {
        self.engines.push(Box::new(engine));
        self
    }

    pub fn delete_target_if_exists(mut self, delete: bool) -> Self {
        self.delete_target_if_exists = delete;
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn run<S: AsRef<Path>, T: AsRef<Path>>(
        &self,
        source_dir: S,
        target_dir: T,
    ) -> Result<RenderReport, RenderError> {
        let source_dir = source_dir.as_ref();
        let target_dir = target_dir.as_ref();

        // Checked before the target is touched so a bad source never costs
        // an existing build.
        let scanner = PathScanner::new(source_dir);
        scanner.validate()?;

        self.prepare_target(source_dir, target_dir)?;

        let tree = scanner.scan()?;
        self.events.emit(RenderEvent::SourceScanned {
            root: source_dir.to_path_buf(),
            files: tree.len(),
        });

        let mut report = RenderReport::default();
        let mut owners: HashMap<RelativePath, &str> = HashMap::new();

        for engine in &self.engines {
            let name = engine.name();
            let claimed = engine.render(source_dir, target_dir, &tree)?;

            for path in &claimed {
                if !tree.contains(path) {
                    return Err(RenderError::UnknownClaim {
                        engine: name.to_string(),
                        path: path.to_string(),
                    });
                }
                if let Some(first) = owners.insert(path.clone(), name) {
                    return Err(RenderError::ConflictingClaim {
                        path: path.to_string(),
                        first: first.to_string(),
                        second: name.to_string(),
                    });
                }
            }

            self.events.emit(RenderEvent::EngineFinished {
                engine: name.to_string(),
                claimed: claimed.len(),
            });
            report
                .claimed
                .entry(name.to_string())
                .or_default()
                .extend(claimed);
        }

        for path in tree.iter().filter(|p| !owners.contains_key(*p)) {
            copy_verbatim(source_dir, target_dir, path)?;
            self.events.emit(RenderEvent::AssetCopied {
                path: path.to_string(),
            });
            report.copied.insert(path.clone());
        }

        Ok(report)
    }

    fn prepare_target(&self, source_dir: &Path, target_dir: &Path) -> Result<(), RenderError> {
        if target_dir.exists() {
            if contains_or_equals(target_dir, source_dir)? {
                return Err(RenderError::invalid_directory(
                    target_dir,
                    format!("target contains the source directory {}", source_dir.display()),
                ));
            }
            if !self.delete_target_if_exists {
                return Err(RenderError::TargetExists {
                    path: target_dir.to_path_buf(),
                });
            }

            self.events.emit(RenderEvent::TargetDeleted {
                path: target_dir.to_path_buf(),
            });
            let removed = if target_dir.is_dir() {
                std::fs::remove_dir_all(target_dir)
            } else {
                std::fs::remove_file(target_dir)
            };
            removed.map_err(|err| RenderError::io(target_dir, err))?;
        }

        self.events.emit(RenderEvent::TargetCreated {
            path: target_dir.to_path_buf(),
        });
        std::fs::create_dir_all(target_dir).map_err(|err| RenderError::io(target_dir, err))
    }
}

fn contains_or_equals(outer: &Path, inner: &Path) -> Result<bool, RenderError> {
    let canonical = |path: &Path| -> Result<PathBuf, RenderError> {
        path.canonicalize().map_err(|err| RenderError::io(path, err))
    };
    Ok(canonical(inner)?.starts_with(canonical(outer)?))
}

fn copy_verbatim(
    source_dir: &Path,
    target_dir: &Path,
    path: &RelativePath,
) -> Result<(), RenderError> {
    let from = path.to_path(source_dir);
    let to = path.to_path(target_dir);
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|err| RenderError::io(parent, err))?;
    }
    std::fs::copy(&from, &to).map_err(|err| RenderError::io(&from, err))?;
    Ok(())
}
