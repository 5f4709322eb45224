use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use mdsite_dev_server::{ServerConfig, StaticServer};

use crate::cmd::build::{add_build_args, run_build};
use crate::config::MdsiteConfig;

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("serve"))
        .about("Build the site and serve it locally")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16))
                .help("Port to serve on [default: 3000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = MdsiteConfig::load(args)?;

    run_build(&config.site)?;

    let server = StaticServer::new(ServerConfig {
        host: config.serve.host.clone(),
        port: config.serve.port,
        root: config.site.output_dir.clone(),
        open: config.serve.open,
    });

    server.run().await
}
