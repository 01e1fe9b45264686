//! Scoped install resource: run `npm install` inside one copied package.
use std::path::Path;

use crate::config::{INSTALL_PROGRAM, MANIFEST_FILE, STORE_DIR};
use crate::exec::{Executor, OutputMode};
use crate::logging::Log;
use crate::operations::FileSystemOps;

/// Options forwarded from the run to every scoped install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Install development dependencies too (omit `--production`).
    pub include_dev: bool,
    /// Discard the install command's output.
    pub silent: bool,
}

/// Why a scoped install did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The copy has no `package.json`, so there is nothing to install.
    NoManifest,
    /// The copy already has its own `node_modules`.
    StoreExists,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoManifest => write!(f, "no {MANIFEST_FILE}"),
            Self::StoreExists => write!(f, "{STORE_DIR} already present"),
        }
    }
}

/// Result of a scoped install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The install command ran and exited successfully.
    Installed,
    /// A precondition made the install unnecessary.
    Skipped(SkipReason),
    /// The install command could not run or exited non-zero.  Soft failure:
    /// logged, never raised.
    Failed {
        /// Human-readable reason.
        reason: String,
    },
}

/// Build the install arguments for the given options.
///
/// # Examples
///
/// ```
/// use materialize_cli::resources::install::{InstallOptions, install_args};
///
/// let args = install_args(InstallOptions::default());
/// assert_eq!(args, ["install", "--no-audit", "--no-fund", "--production"]);
/// ```
#[must_use]
pub fn install_args(options: InstallOptions) -> Vec<&'static str> {
    let mut args = vec!["install", "--no-audit", "--no-fund"];
    if !options.include_dev {
        args.push("--production");
    }
    args
}

/// Runs the package manager's install step inside a single directory.
pub struct ScopedInstall<'a> {
    fs: &'a dyn FileSystemOps,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl std::fmt::Debug for ScopedInstall<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedInstall")
            .field("fs", &self.fs)
            .field("executor", &"<dyn Executor>")
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl<'a> ScopedInstall<'a> {
    /// Create an installer over the given capabilities.
    #[must_use]
    pub const fn new(
        fs: &'a dyn FileSystemOps,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self { fs, executor, log }
    }

    /// Install `dir`'s own dependencies unless it has no manifest or already
    /// has a dependency store.
    ///
    /// Never fails: spawn errors and non-zero exits are logged and returned
    /// as [`InstallOutcome::Failed`] so sibling dependencies keep going.
    pub fn install_into(&self, dir: &Path, options: InstallOptions) -> InstallOutcome {
        if !self.fs.exists(&dir.join(MANIFEST_FILE)) {
            self.log.info(&format!(
                "no {MANIFEST_FILE} in {}, skipping install",
                dir.display()
            ));
            return InstallOutcome::Skipped(SkipReason::NoManifest);
        }

        if self.fs.exists(&dir.join(STORE_DIR)) {
            self.log.info(&format!(
                "{STORE_DIR} already exists in {}, skipping install",
                dir.display()
            ));
            return InstallOutcome::Skipped(SkipReason::StoreExists);
        }

        if !self.executor.which(INSTALL_PROGRAM) {
            let reason = format!("{INSTALL_PROGRAM} not found on PATH");
            self.log
                .error(&format!("cannot install in {}: {reason}", dir.display()));
            return InstallOutcome::Failed { reason };
        }

        let args = install_args(options);
        self.log.info(&format!(
            "running {INSTALL_PROGRAM} {} in {}",
            args.join(" "),
            dir.display()
        ));

        let result = self.executor.run_in(
            dir,
            INSTALL_PROGRAM,
            &args,
            OutputMode::from_silent(options.silent),
        );
        match result {
            Ok(r) if r.success => InstallOutcome::Installed,
            Ok(r) => {
                let reason = r.code.map_or_else(
                    || format!("{INSTALL_PROGRAM} was terminated by a signal"),
                    |code| format!("{INSTALL_PROGRAM} exited with code {code}"),
                );
                self.log
                    .error(&format!("install failed in {}: {reason}", dir.display()));
                InstallOutcome::Failed { reason }
            }
            Err(e) => {
                let reason = format!("{e:#}");
                self.log
                    .error(&format!("install failed in {}: {reason}", dir.display()));
                InstallOutcome::Failed { reason }
            }
        }
    }
}
