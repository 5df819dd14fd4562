use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use microsite_core::{MarkdownEngine, PageIndex, RenderOrchestrator};
use tracing::{debug, info};

use crate::config::load_render_config;

pub fn add_render_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .value_name("SOURCE")
                .help("Directory containing the site's Markdown and asset files"),
        )
        .arg(
            Arg::new("target")
                .value_name("TARGET")
                .help("Directory to write the rendered site into"),
        )
        .arg(
            Arg::new("delete-target-dir")
                .short('d')
                .long("delete-target-dir")
                .action(ArgAction::SetTrue)
                .help("Delete TARGET first if it already exists"),
        )
        .arg(
            Arg::new("rewrite-md-extensions")
                .short('r')
                .long("rewrite-md-extensions")
                .action(ArgAction::SetTrue)
                .help("Write .md sources out as .html files"),
        )
        .arg(
            Arg::new("rewrite-md-urls")
                .short('u')
                .long("rewrite-md-urls")
                .action(ArgAction::SetTrue)
                .help("Rewrite relative links to .md files so they end in .html"),
        )
        .arg(
            Arg::new("pretty")
                .short('p')
                .long("pretty")
                .action(ArgAction::SetTrue)
                .help("Indent the generated HTML instead of compacting it"),
        )
        .arg(
            Arg::new("stylesheet")
                .short('s')
                .long("stylesheet")
                .value_name("FILE")
                .help("CSS file to install instead of the built-in stylesheet"),
        )
        .arg(
            Arg::new("stylesheet-target-name")
                .long("stylesheet-target-name")
                .value_name("NAME")
                .help("File name of the stylesheet inside TARGET [default: style.css]"),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_name("FILE")
                .help("Page template to use instead of the built-in one"),
        )
        .arg(
            Arg::new("title")
                .long("title")
                .value_name("TEXT")
                .help("Title for pages without one in the project index"),
        )
        .arg(
            Arg::new("extension")
                .short('x')
                .long("extension")
                .value_name("NAME")
                .action(ArgAction::Append)
                .help("Markdown extension to enable, e.g. tables or codehilite (repeatable)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Project file [default: ./microsite.toml when present]"),
        )
}

pub fn make_subcommand() -> Command {
    add_render_args(Command::new("render"))
        .about("Render a directory of Markdown into a static site")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = load_render_config(args)?;
    let source = config.source()?;
    let target = config.target()?;
    debug!(?config, "resolved configuration");

    let index = PageIndex::try_from(config.index.clone())?;
    let engine = MarkdownEngine::new(config.markdown.clone(), index)?;

    let report = RenderOrchestrator::new()
        .engine(engine)
        .delete_target_if_exists(config.render.delete_target_dir)
        .run(source, target)
        .with_context(|| {
            format!(
                "failed to render {} into {}",
                source.display(),
                target.display()
            )
        })?;

    info!(
        rendered = report.claimed_union().len(),
        copied = report.copied.len(),
        target = %target.display(),
        "site rendered"
    );

    Ok(())
}
