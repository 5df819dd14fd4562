//! The Markdown render engine.
//!
//! Converts every `.md` source into a full HTML page through the configured
//! template, wires in the installed stylesheet, and optionally rewrites
//! extensions and links so the output reads as a website.

mod convert;

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{MarkdownConfig, PageIndex};
use crate::engine::{RenderEngine, RenderedSet};
use crate::error::RenderError;
use crate::events::{EventSink, RenderEvent, default_sink};
use crate::html;
use crate::path::{HTML_EXTENSION, RelativePath, SourceTree};
use crate::template::{PageContext, PageTemplate};

pub use convert::ExtensionSet;

pub const DEFAULT_STYLESHEET: &str = include_str!("../../assets/plain-white.css");

pub struct MarkdownEngine {
    config: MarkdownConfig,
    index: PageIndex,
    extensions: ExtensionSet,
    template: PageTemplate,
    events: Arc<dyn EventSink>,
}

impl MarkdownEngine {
    /// Validates the configuration and compiles the template.
    pub fn new(config: MarkdownConfig, index: PageIndex) -> Result<Self, RenderError> {
        config.validate()?;

        let template = match &config.html_template {
            Some(path) => PageTemplate::from_file(path)?,
            None => PageTemplate::builtin()?,
        };
        if let Some(stylesheet) = &config.stylesheet {
            if !stylesheet.is_file() {
                return Err(RenderError::InvalidConfig {
                    key: "stylesheet".to_string(),
                    reason: format!("{} is not a file", stylesheet.display()),
                });
            }
        }
        let extensions = ExtensionSet::resolve(&config.extensions);

        Ok(Self {
            config,
            index,
            extensions,
            template,
            events: default_sink(),
        })
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &MarkdownConfig {
        &self.config
    }

    /// The stylesheet's path under the target, which must not shadow a source.
    fn stylesheet_path(&self, paths: &SourceTree) -> Result<RelativePath, RenderError> {
        let name = &self.config.stylesheet_target_name;
        let installed = RelativePath::parse(name)?;
        if paths.contains(&installed) {
            return Err(RenderError::StylesheetConflict { name: name.clone() });
        }
        Ok(installed)
    }

    /// Fails if any page would be written over a source file or the stylesheet.
    fn check_outputs(
        &self,
        pages: &[&RelativePath],
        paths: &SourceTree,
        stylesheet: &RelativePath,
    ) -> Result<(), RenderError> {
        for source in pages {
            let output = self.output_path(source);
            let shadows_source = output != **source && paths.contains(&output);
            if shadows_source || output == *stylesheet {
                return Err(RenderError::OutputConflict {
                    source_path: source.to_string(),
                    output: output.to_string(),
                });
            }
        }
        Ok(())
    }

    fn install_stylesheet(
        &self,
        target_dir: &Path,
        installed: &RelativePath,
    ) -> Result<(), RenderError> {
        let name = &self.config.stylesheet_target_name;
        let target = installed.to_path(target_dir);
        match &self.config.stylesheet {
            Some(source) => {
                std::fs::copy(source, &target).map_err(|err| RenderError::io(source, err))?;
            }
            None => {
                std::fs::write(&target, DEFAULT_STYLESHEET)
                    .map_err(|err| RenderError::io(&target, err))?;
            }
        }

        self.events
            .emit(RenderEvent::StylesheetInstalled { name: name.clone() });
        Ok(())
    }

    fn output_path(&self, source: &RelativePath) -> RelativePath {
        if self.config.rewrite_md_extensions {
            source.with_extension(HTML_EXTENSION)
        } else {
            source.clone()
        }
    }

    fn render_page(
        &self,
        source_dir: &Path,
        target_dir: &Path,
        source: &RelativePath,
    ) -> Result<(), RenderError> {
        let output = self.output_path(source);
        let target = output.to_path(target_dir);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|err| RenderError::io(parent, err))?;
        }

        let source_path = source.to_path(source_dir);
        let is_file = std::fs::metadata(&source_path)
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(RenderError::NotARegularFile { path: source_path });
        }
        let markdown = std::fs::read_to_string(&source_path)
            .map_err(|err| RenderError::io(&source_path, err))?;

        let fragment = self.extensions.to_html(&markdown);
        let stylesheet = source.relative_reference(&self.config.stylesheet_target_name);

        let entry = self.index.get(source);
        let title = entry
            .and_then(|e| e.title.as_deref())
            .or(self.config.title.as_deref())
            .unwrap_or_default();
        let tags = entry.map(|e| e.tags.as_slice()).unwrap_or_default();

        let mut page = self.template.render(&PageContext {
            stylesheet: &stylesheet,
            title,
            html: &fragment,
            tags,
        })?;

        if self.config.rewrite_md_urls {
            let (rewritten, links) =
                html::rewrite_md_links(&page).map_err(|message| RenderError::Rewrite {
                    path: source.to_string(),
                    message,
                })?;
            for link in links {
                self.events.emit(RenderEvent::LinkRewritten {
                    page: source.to_string(),
                    from: link.from,
                    to: link.to,
                });
            }
            page = rewritten;
        }

        let page = if self.config.pretty_html {
            html::prettify(&page)
        } else {
            html::compact(&page)
        };

        std::fs::write(&target, page).map_err(|err| RenderError::io(&target, err))?;

        self.events.emit(RenderEvent::PageRendered {
            source: source.to_string(),
            target: output.to_string(),
        });
        Ok(())
    }
}

impl RenderEngine for MarkdownEngine {
    fn name(&self) -> &str {
        "markdown"
    }

    fn render(
        &self,
        source_dir: &Path,
        target_dir: &Path,
        paths: &SourceTree,
    ) -> Result<RenderedSet, RenderError> {
        for name in self.extensions.ignored() {
            self.events
                .emit(RenderEvent::ExtensionIgnored { name: name.clone() });
        }

        let stylesheet = self.stylesheet_path(paths)?;
        let pages: Vec<&RelativePath> = paths.iter().filter(|p| p.is_markdown()).collect();
        self.check_outputs(&pages, paths, &stylesheet)?;

        // Pages link to the installed name, so it has to be settled first.
        self.install_stylesheet(target_dir, &stylesheet)?;

        pages
            .par_iter()
            .try_for_each(|source| self.render_page(source_dir, target_dir, source))?;

        Ok(pages.into_iter().cloned().collect())
    }
}
