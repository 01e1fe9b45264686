//! External process execution behind a mockable trait.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// How the child process's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Share the parent's stdout and stderr.
    Inherit,
    /// Discard all child output.
    Silent,
}

impl OutputMode {
    /// `Silent` when `silent` is set, `Inherit` otherwise.
    #[must_use]
    pub const fn from_silent(silent: bool) -> Self {
        if silent { Self::Silent } else { Self::Inherit }
    }

    fn stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Silent => Stdio::null(),
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<ExitStatus> for ExecResult {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Abstraction over external process execution.
///
/// The install step talks to this trait rather than [`Command`] directly so
/// that tests can substitute a fake and assert on the exact program,
/// arguments, and working directory.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Run `program` with `args` inside `dir`, blocking until it exits.
    ///
    /// A non-zero exit is reported through [`ExecResult::success`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run_in(
        &self,
        dir: &Path,
        program: &str,
        args: &[&'static str],
        output: OutputMode,
    ) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_in(
        &self,
        dir: &Path,
        program: &str,
        args: &[&'static str],
        output: OutputMode,
    ) -> Result<ExecResult> {
        // Resolving through `which` picks up `npm.cmd` on Windows.
        let resolved = which::which(program).unwrap_or_else(|_| PathBuf::from(program));
        let status = Command::new(&resolved)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(output.stdio())
            .stderr(output.stdio())
            .status()
            .with_context(|| format!("failed to execute: {program} in {}", dir.display()))?;
        Ok(ExecResult::from(status))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
