//! The materialize command: replace symlinked `file:` dependencies with copies.
use anyhow::{Context as _, Result};
use std::path::Path;

use crate::config::manifest::{self, DependencySpec};
use crate::config::{MANIFEST_FILE, MaterializeOptions};
use crate::error::MaterializeError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::resources::install::{InstallOptions, InstallOutcome, ScopedInstall};
use crate::resources::store_entry::{StoreEntry, StoreEntryState};

/// What happened to a single `file:` dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyStatus {
    /// Nothing exists at the store entry; the dependency was never installed.
    StoreEntryMissing,
    /// The store entry is already a real directory and was left untouched.
    AlreadyMaterialized,
    /// The symlink was replaced with a copy.  `install` is `None` when the
    /// install step was disabled for the run.
    Materialized {
        /// Outcome of the scoped install, if one was attempted.
        install: Option<InstallOutcome>,
    },
    /// Removing the symlink or copying the source tree failed.
    Failed {
        /// Human-readable reason.
        reason: String,
    },
}

/// Per-dependency result, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOutcome {
    /// Package name.
    pub name: String,
    /// Final status.
    pub status: DependencyStatus,
}

/// Result of a full materialization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// One entry per `file:` dependency, in manifest order.
    pub outcomes: Vec<DependencyOutcome>,
}

impl MaterializeReport {
    /// Number of store entries replaced with a copy during this run.
    #[must_use]
    pub fn materialized_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DependencyStatus::Materialized { .. }))
            .count()
    }

    /// Names of dependencies whose copy failed.
    #[must_use]
    pub fn failures(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DependencyStatus::Failed { .. }))
            .map(|o| o.name.as_str())
            .collect()
    }

    /// One plain-text line per dependency for the run summary.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|o| {
                let (icon, detail) = match &o.status {
                    DependencyStatus::StoreEntryMissing => ("○", "not installed".to_string()),
                    DependencyStatus::AlreadyMaterialized => {
                        ("·", "already a directory".to_string())
                    }
                    DependencyStatus::Materialized { install: None } => {
                        ("✓", "copied, install skipped".to_string())
                    }
                    DependencyStatus::Materialized {
                        install: Some(InstallOutcome::Installed),
                    } => ("✓", "copied, installed".to_string()),
                    DependencyStatus::Materialized {
                        install: Some(InstallOutcome::Skipped(reason)),
                    } => ("✓", format!("copied, install skipped: {reason}")),
                    DependencyStatus::Materialized {
                        install: Some(InstallOutcome::Failed { reason }),
                    } => ("✓", format!("copied, install failed: {reason}")),
                    DependencyStatus::Failed { reason } => ("✗", reason.clone()),
                };
                format!("{icon} {} ({detail})", o.name)
            })
            .collect()
    }

    /// Turn the report into the run's final result.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError::DependenciesFailed`] naming every
    /// dependency whose copy failed.
    pub fn into_result(self) -> Result<Self, MaterializeError> {
        let names: Vec<String> = self.failures().into_iter().map(String::from).collect();
        if names.is_empty() {
            Ok(self)
        } else {
            Err(MaterializeError::DependenciesFailed {
                count: names.len(),
                names,
            })
        }
    }
}

/// Replaces symlinked `file:` dependencies in the store with real copies.
pub struct Materializer<'a> {
    fs: &'a dyn FileSystemOps,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl std::fmt::Debug for Materializer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Materializer")
            .field("fs", &self.fs)
            .field("executor", &"<dyn Executor>")
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl<'a> Materializer<'a> {
    /// Create a materializer over the given capabilities.
    #[must_use]
    pub const fn new(
        fs: &'a dyn FileSystemOps,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self { fs, executor, log }
    }

    /// Visit every dependency in the manifest at `root` and report what
    /// happened to each.
    ///
    /// Dependencies are processed one at a time in manifest order.  A failed
    /// copy is logged and recorded in the report, and the pass continues with
    /// the next dependency.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError::Manifest`] if `package.json` is missing or
    /// malformed.  Nothing is touched in that case.
    pub fn pass(
        &self,
        root: &Path,
        options: &MaterializeOptions,
    ) -> Result<MaterializeReport, MaterializeError> {
        let manifest = manifest::load(self.fs, &root.join(MANIFEST_FILE))?;

        let mut report = MaterializeReport::default();
        for dep in manifest.merged_dependencies() {
            let Some(source) = dep.source_dir(root) else {
                self.log.debug(&format!(
                    "{}: not a file dependency ({}), skipping",
                    dep.name, dep.specifier
                ));
                continue;
            };
            let status = self.materialize_one(root, &dep, source, options);
            report.outcomes.push(DependencyOutcome {
                name: dep.name,
                status,
            });
        }
        Ok(report)
    }

    /// Run a full pass and fail if any dependency could not be copied.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError::Manifest`] as [`pass`](Self::pass) does,
    /// and [`MaterializeError::DependenciesFailed`] after the pass if any
    /// copy failed.
    pub fn run(
        &self,
        root: &Path,
        options: &MaterializeOptions,
    ) -> Result<MaterializeReport, MaterializeError> {
        self.pass(root, options)?.into_result()
    }

    fn materialize_one(
        &self,
        root: &Path,
        dep: &DependencySpec,
        source: std::path::PathBuf,
        options: &MaterializeOptions,
    ) -> DependencyStatus {
        let entry = StoreEntry::new(root, &dep.name, source);

        match entry.current_state(self.fs) {
            StoreEntryState::Missing => {
                self.log.warn(&format!(
                    "{} not found in store, skipping (run npm install first?)",
                    entry.path.display()
                ));
                return DependencyStatus::StoreEntryMissing;
            }
            StoreEntryState::Materialized => {
                self.log.info(&format!(
                    "{} is not a symlink, skipping",
                    entry.path.display()
                ));
                return DependencyStatus::AlreadyMaterialized;
            }
            StoreEntryState::Symlink => {}
        }

        self.log.info(&format!("replacing symlink {}", entry.description()));
        if let Err(e) = entry.replace_with_copy(self.fs) {
            self.log.error(&format!("{}: {e}", dep.name));
            return DependencyStatus::Failed {
                reason: e.to_string(),
            };
        }

        if options.skip_install {
            return DependencyStatus::Materialized { install: None };
        }

        let install = ScopedInstall::new(self.fs, self.executor, self.log).install_into(
            &entry.path,
            InstallOptions {
                include_dev: options.include_dev,
                silent: options.silent,
            },
        );
        DependencyStatus::Materialized {
            install: Some(install),
        }
    }
}

/// Run a full materialization pass over the project at `root`.
///
/// Convenience wrapper around [`Materializer::run`].
///
/// # Errors
///
/// See [`Materializer::run`].
pub fn materialize(
    root: &Path,
    options: &MaterializeOptions,
    fs: &dyn FileSystemOps,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<MaterializeReport, MaterializeError> {
    Materializer::new(fs, executor, log).run(root, options)
}

/// Run the materialize command against the current working directory.
///
/// # Errors
///
/// Returns an error if the working directory cannot be resolved, or for any
/// reason [`run_at`] fails.
pub fn run(options: &MaterializeOptions, log: &dyn Log) -> Result<()> {
    let cwd = std::env::current_dir().context("resolving current directory")?;
    let root = dunce::canonicalize(&cwd)
        .with_context(|| format!("canonicalizing {}", cwd.display()))?;

    let version = option_env!("MATERIALIZE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.debug(&format!("materialize {version}"));

    run_at(&root, options, &SystemFileSystemOps, &SystemExecutor, log)
}

/// Run the materialize command for the project at `root`.
///
/// The per-dependency summary is printed through `log` whenever at least one
/// `file:` dependency was visited, including when some of them failed.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or any dependency
/// failed to copy.
pub fn run_at(
    root: &Path,
    options: &MaterializeOptions,
    fs: &dyn FileSystemOps,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<()> {
    log.stage(&format!("Materializing file: dependencies in {}", root.display()));
    let report = Materializer::new(fs, executor, log).pass(root, options)?;

    if !report.outcomes.is_empty() {
        log.stage("Summary");
        for line in report.summary_lines() {
            log.info(&line);
        }
    }

    report.into_result()?;
    Ok(())
}
