//! Domain-specific error types for the materialization engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Library code returns typed errors while the binary converts them to
//! [`anyhow::Error`] at the process boundary via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! MaterializeError
//! ├── Manifest(ManifestError)     : fatal: package.json missing or malformed
//! └── DependenciesFailed { .. }   : one or more store entries could not be copied
//!
//! CopyError                       : a single dependency's tree copy failed
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error returned by [`materialize`](crate::commands::materialize::materialize).
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// The project manifest could not be loaded. Aborts the whole run.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Every dependency was visited, but some could not be materialized.
    #[error("{count} dependency(ies) failed to materialize: {}", names.join(", "))]
    DependenciesFailed {
        /// Number of failed dependencies.
        count: usize,
        /// Names of the failed dependencies, in processing order.
        names: Vec<String>,
    },
}

/// Errors that arise while loading `package.json`.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No manifest exists at the expected location.
    #[error("no package.json found at {}", path.display())]
    NotFound {
        /// Expected manifest path.
        path: PathBuf,
    },

    /// The manifest exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or has the wrong shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Manifest path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Errors that arise while replacing a single store entry with a copy.
#[derive(Error, Debug)]
pub enum CopyError {
    /// The symlink occupying the store entry could not be removed.
    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        /// Store entry path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The tree walk or a file copy failed.
    #[error("failed to copy {} to {}: {cause:#}", from.display(), to.display())]
    Tree {
        /// Source tree root.
        from: PathBuf,
        /// Destination store entry.
        to: PathBuf,
        /// Underlying error with the failing path as context.
        cause: anyhow::Error,
    },

    /// The copy failed and the partial entry could not be replaced by the
    /// original link, so the store entry is left in an unknown state.
    #[error(
        "failed to copy {} to {}: {cause:#}; restoring the link also failed: {restore}",
        from.display(),
        to.display()
    )]
    NotRestored {
        /// Source tree root.
        from: PathBuf,
        /// Destination store entry.
        to: PathBuf,
        /// Error that aborted the copy.
        cause: anyhow::Error,
        /// Error raised while rolling back.
        restore: std::io::Error,
    },
}
