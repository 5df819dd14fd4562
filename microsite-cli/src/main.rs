mod cmd;
mod config;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn cli() -> Command {
    Command::new("microsite")
        .about("Render Markdown source trees into static HTML sites")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log every page, link and asset"),
        )
        .subcommand(cmd::render::make_subcommand())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("microsite={level},microsite_core={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("render", args)) => cmd::render::execute(args),
        _ => unreachable!("clap requires a known subcommand"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        cli().debug_assert();
    }

    #[test]
    fn verbose_is_accepted_after_the_subcommand() {
        let matches = cli()
            .try_get_matches_from(["microsite", "render", "a", "b", "-v"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }
}
