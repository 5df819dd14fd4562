use std::collections::BTreeSet;
use std::path::Path;

use crate::error::RenderError;
use crate::path::{RelativePath, SourceTree};

/// Source paths an engine took responsibility for during one pass.
pub type RenderedSet = BTreeSet<RelativePath>;

/// A content transformer that claims part of a source tree.
///
/// Every registered engine sees the full tree and decides relevance on its
/// own. An engine writes only under `target_dir` and claims only source
/// paths it produced an artifact for. Files it writes that aren't source
/// paths, like an installed stylesheet, are not claimed. Running it twice
/// over the same inputs into a prepared target yields the same bytes.
pub trait RenderEngine: Send + Sync {
    /// Name used in events and claim conflict errors.
    fn name(&self) -> &str;

    fn render(
        &self,
        source_dir: &Path,
        target_dir: &Path,
        paths: &SourceTree,
    ) -> Result<RenderedSet, RenderError>;
}
