//! Command-line interface definition.
use clap::Parser;

use crate::config::MaterializeOptions;

/// Replace symlinked `file:` dependencies in `node_modules` with real copies.
///
/// Run from a project root (typically as a `postinstall` script).  Every
/// `file:` dependency whose `node_modules` entry is a symlink is replaced with
/// a recursive copy of its source, and the copy's own dependencies are then
/// installed in place.
#[derive(Parser, Debug)]
#[command(
    name = "materialize",
    version = option_env!("MATERIALIZE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
)]
pub struct Cli {
    /// Suppress all output, including errors and the install command's output
    #[arg(long)]
    pub silent: bool,

    /// Copy dependencies but skip installing their own dependencies
    #[arg(long = "no-install")]
    pub skip_install: bool,

    /// Also install development dependencies inside each copy
    #[arg(long)]
    pub dev: bool,
}

impl From<&Cli> for MaterializeOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            silent: cli.silent,
            skip_install: cli.skip_install,
            include_dev: cli.dev,
        }
    }
}
