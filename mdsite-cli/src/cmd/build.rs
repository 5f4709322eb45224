use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use mdsite_core::{BuildReport, SiteConfig, build_site};

use crate::config::{DEFAULT_CONFIG_FILE, MdsiteConfig};

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("DIR")
                .help("Directory containing markdown files [default: docs]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site [default: site]"),
        )
        .arg(
            Arg::new("nav")
                .long("nav")
                .value_name("MODE")
                .value_parser(["flat", "grouped"])
                .help("Navigation style: a link bar on every page or a grouped index page"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Directory with page.html, index.html or nav.html overrides"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new("no-clean")
                .long("no-clean")
                .help("Keep existing files in the output directory")
                .action(ArgAction::SetTrue),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Build static site from markdown files")
}

/// Build once and log a summary. Shared with `serve`.
pub fn run_build(site: &SiteConfig) -> Result<BuildReport> {
    let report = build_site(site)
        .with_context(|| format!("Failed to build site from {}", site.input_dir.display()))?;

    if !report.is_clean() {
        tracing::warn!("{} item(s) were skipped, see messages above", report.failures.len());
    }

    Ok(report)
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = MdsiteConfig::load(args)?;

    run_build(&config.site)?;

    println!("Site built successfully in {}", config.site.output_dir.display());

    Ok(())
}
