//! qtbuild CLI - Build Qt-based Python extension modules with qmake

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use qtbuild::util::{Reporter, Shell};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("qtbuild=debug")
    } else {
        EnvFilter::new("qtbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell: Arc<dyn Reporter> = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color));

    match cli.command {
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Install(args) => commands::install::execute(args, shell),
        Commands::Bundle(args) => commands::bundle::execute(args, shell),
        Commands::QtWheel(args) => commands::qt_wheel::execute(args, shell),
        Commands::Query(args) => commands::query::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
