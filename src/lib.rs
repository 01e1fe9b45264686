//! Local dependency materializer.
//!
//! npm installs `file:` dependencies as symbolic links into `node_modules`.
//! This crate replaces each such link with a real recursive copy of the
//! linked source and then installs the copy's own dependencies inside it, so
//! the project tree no longer depends on the sibling checkout.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: run options and `package.json` parsing
//! - **[`resources`]**: store entries, recursive copy, scoped install
//! - **[`commands`]**: the materialization pass and its report
//! - **[`operations`]** and **[`exec`]**: filesystem and process ports
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod resources;
