use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment};
use microsite_core::{IndexEntry, MarkdownConfig, ProjectConfig, RenderSettings};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "./microsite.toml";

/// Settings for one `render` invocation after every layer has been applied.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MicrositeConfig {
    pub render: RenderSettings,
    pub markdown: MarkdownConfig,
    /// Taken from the project file as written; never layered.
    #[serde(skip)]
    pub index: BTreeMap<String, IndexEntry>,
}

impl MicrositeConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (MICROSITE_*)
    /// 3. Project file (`--config`, or `./microsite.toml` when present)
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let project = match args.get_one::<String>("config") {
            Some(path) => ProjectConfig::read(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                ProjectConfig::read(DEFAULT_CONFIG_FILE)?
            }
            None => ProjectConfig::default(),
        };

        // Project file, with defaults for anything it leaves out
        let base = Self {
            render: project.render,
            markdown: project.markdown,
            index: BTreeMap::new(),
        };
        let mut builder = ConfigBuilder::builder().add_source(ConfigBuilder::try_from(&base)?);

        // Environment, e.g. MICROSITE_MARKDOWN__PRETTY_HTML=true
        builder = builder.add_source(
            Environment::with_prefix("MICROSITE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("markdown.extensions"),
        );

        // Command line
        for (id, key) in [
            ("source", "render.source"),
            ("target", "render.target"),
            ("stylesheet", "markdown.stylesheet"),
            ("stylesheet-target-name", "markdown.stylesheet_target_name"),
            ("template", "markdown.html_template"),
            ("title", "markdown.title"),
        ] {
            if let Some(value) = args.get_one::<String>(id) {
                builder = builder.set_override(key, value.as_str())?;
            }
        }
        for (id, key) in [
            ("delete-target-dir", "render.delete_target_dir"),
            ("rewrite-md-extensions", "markdown.rewrite_md_extensions"),
            ("rewrite-md-urls", "markdown.rewrite_md_urls"),
            ("pretty", "markdown.pretty_html"),
        ] {
            if args.get_flag(id) {
                builder = builder.set_override(key, true)?;
            }
        }
        if let Some(extensions) = args.get_many::<String>("extension") {
            let extensions: Vec<String> = extensions.cloned().collect();
            builder = builder.set_override("markdown.extensions", extensions)?;
        }

        let mut config: MicrositeConfig = builder
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;
        config.index = project.index;

        Ok(config)
    }

    pub fn source(&self) -> Result<&PathBuf> {
        match &self.render.source {
            Some(source) => Ok(source),
            None => bail!("no source directory given on the command line or in [render]"),
        }
    }

    pub fn target(&self) -> Result<&PathBuf> {
        match &self.render.target {
            Some(target) => Ok(target),
            None => bail!("no target directory given on the command line or in [render]"),
        }
    }
}

/// Load configuration specifically for render commands
pub fn load_render_config(args: &ArgMatches) -> Result<MicrositeConfig> {
    MicrositeConfig::load(args)
}
