//! # mdsite CLI
//!
//! Turns a folder of markdown into a static site, and optionally serves it.

mod cmd;
mod config;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

fn cli() -> Command {
    Command::new("mdsite")
        .about("Turn a folder of markdown into a browsable static site")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"))?;

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        _ => unreachable!("clap enforces a known subcommand"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn serve_accepts_build_flags() {
        let matches = cli()
            .try_get_matches_from(["mdsite", "serve", "-i", "notes", "--nav", "flat", "-p", "8080"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();

        assert_eq!(name, "serve");
        assert_eq!(args.get_one::<String>("input").map(String::as_str), Some("notes"));
        assert_eq!(args.get_one::<u16>("port"), Some(&8080));
    }

    #[test]
    fn rejects_unknown_nav_mode() {
        assert!(
            cli()
                .try_get_matches_from(["mdsite", "build", "--nav", "sideways"])
                .is_err()
        );
    }

    #[test]
    fn build_command_writes_site() {
        let tmp = tempfile::TempDir::new().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("a.md"), "# A").unwrap();
        let out = tmp.path().join("site");

        let matches = cli()
            .try_get_matches_from([
                "mdsite",
                "build",
                "-c",
                tmp.path().join("mdsite.toml").to_str().unwrap(),
                "-i",
                docs.to_str().unwrap(),
                "-o",
                out.to_str().unwrap(),
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        cmd::build::execute(args).unwrap();
        assert!(out.join("a.html").is_file());
        assert!(out.join("index.html").is_file());
    }
}
