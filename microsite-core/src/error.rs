use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that terminate a render pass.
///
/// None of these are retried: they describe configuration or precondition
/// violations, and a failed pass may leave a partially populated target.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid directory {path}: {reason}")]
    InvalidDirectory { path: PathBuf, reason: String },

    #[error("target directory {path} already exists, but deleting it was not requested")]
    TargetExists { path: PathBuf },

    #[error(
        "the stylesheet's filename ({name}) conflicts with a file in the source content; \
         specify an alternate stylesheet target name"
    )]
    StylesheetConflict { name: String },

    #[error("source file {path} is not a regular file")]
    NotARegularFile { path: PathBuf },

    #[error("rendering {source_path} would overwrite {output}, which is also a source file")]
    OutputConflict { source_path: String, output: String },

    #[error("template not found: {path}")]
    TemplateNotFound { path: PathBuf },

    #[error("invalid value for `{key}`: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("{path} was claimed by both the `{first}` and `{second}` engines")]
    ConflictingClaim {
        path: String,
        first: String,
        second: String,
    },

    #[error("engine `{engine}` claimed {path}, which is not in the source tree")]
    UnknownClaim { engine: String, path: String },

    #[error("path is not valid UTF-8 or escapes its root: {path}")]
    InvalidPath { path: PathBuf },

    #[error("failed to render template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("failed to rewrite links in {path}: {message}")]
    Rewrite { path: String, message: String },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        RenderError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_directory(path: &Path, reason: impl Into<String>) -> Self {
        RenderError::InvalidDirectory {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
