//! `materialize` binary entry point.
use std::process::ExitCode;

use clap::Parser;
use materialize_cli::cli::Cli;
use materialize_cli::commands;
use materialize_cli::config::MaterializeOptions;
use materialize_cli::logging::{self, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber();

    let options = MaterializeOptions::from(&args);
    let log = Logger::new(options.silent);

    match commands::materialize::run(&options, &log) {
        Ok(()) => {
            log.info("local dependencies materialized");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::from(1)
        }
    }
}
