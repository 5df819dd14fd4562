use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::RenderError;

const TEMPLATE_NAME: &str = "page.html";

pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/page.html.tera");

/// Values bound into the page template.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub stylesheet: &'a str,
    pub title: &'a str,
    pub html: &'a str,
    pub tags: &'a [String],
}

/// A single compiled page template.
///
/// Autoescaping is off: bindings are inserted as given, so `{{ html }}`
/// emits markup. Templates escape other values with `| escape` where needed.
pub struct PageTemplate {
    tera: Tera,
    origin: PathBuf,
}

impl PageTemplate {
    /// Loads a template from disk.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        if !path.is_file() {
            return Err(RenderError::TemplateNotFound {
                path: path.to_path_buf(),
            });
        }
        let source = std::fs::read_to_string(path).map_err(|err| RenderError::io(path, err))?;
        Self::from_source(&source, path)
    }

    /// The template shipped with the crate.
    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_source(DEFAULT_TEMPLATE, Path::new("<builtin>"))
    }

    fn from_source(source: &str, origin: &Path) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|err| RenderError::Template {
                path: origin.to_path_buf(),
                source: err,
            })?;

        Ok(Self {
            tera,
            origin: origin.to_path_buf(),
        })
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn render(&self, page: &PageContext<'_>) -> Result<String, RenderError> {
        let context = Context::from_serialize(page).map_err(|err| self.error(err))?;
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|err| self.error(err))
    }

    fn error(&self, source: tera::Error) -> RenderError {
        RenderError::Template {
            path: self.origin.clone(),
            source,
        }
    }
}
