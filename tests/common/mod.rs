// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project fixture and a recording
// executor so each integration test can set up an isolated npm-style layout
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use materialize_cli::exec::{ExecResult, Executor, OutputMode};

/// A project laid out inside a [`tempfile::TempDir`]:
///
/// ```text
/// <tmp>/app/package.json
/// <tmp>/app/node_modules/
/// <tmp>/<sources...>
/// ```
///
/// The directory is deleted when the fixture is dropped.
pub struct ProjectFixture {
    /// Temporary directory holding the project and its sibling sources.
    pub tmp: tempfile::TempDir,
}

impl ProjectFixture {
    /// Create an empty project with the given `package.json` contents.
    pub fn new(manifest: &str) -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = tmp.path().join("app");
        std::fs::create_dir_all(root.join("node_modules")).expect("create node_modules");
        std::fs::write(root.join("package.json"), manifest).expect("write package.json");
        Self { tmp }
    }

    /// The project root (the directory holding `package.json`).
    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("app")
    }

    /// Path of `node_modules/<name>` inside the project.
    pub fn store_entry(&self, name: &str) -> PathBuf {
        self.root().join("node_modules").join(name)
    }

    /// Path of a directory next to the project, e.g. `local-package`.
    pub fn sibling(&self, dir: &str) -> PathBuf {
        self.tmp.path().join(dir)
    }

    /// Write `contents` to `<tmp>/<dir>/<file>`, creating parents.
    pub fn with_source_file(self, dir: &str, file: &str, contents: &str) -> Self {
        let path = self.sibling(dir).join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create source parent");
        }
        std::fs::write(&path, contents).expect("write source file");
        self
    }

    /// Symlink `node_modules/<name>` to `<tmp>/<dir>`, as npm does for a
    /// `file:` dependency.
    #[cfg(unix)]
    pub fn with_symlink_entry(self, name: &str, dir: &str) -> Self {
        let link = self.store_entry(name);
        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent).expect("create store parent");
        }
        std::os::unix::fs::symlink(self.sibling(dir), &link).expect("create store symlink");
        self
    }

    /// Create `node_modules/<name>/<file>` as a real directory entry.
    pub fn with_real_entry(self, name: &str, file: &str, contents: &str) -> Self {
        let path = self.store_entry(name).join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create store entry");
        }
        std::fs::write(&path, contents).expect("write store entry file");
        self
    }
}

/// One recorded `run_in` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
    pub output: OutputMode,
}

/// [`Executor`] fake that records every invocation and never spawns anything.
#[derive(Debug)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<RecordedCall>>,
    success: bool,
}

impl RecordingExecutor {
    /// An executor whose commands all succeed.
    pub fn succeeding() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            success: true,
        }
    }

    /// An executor whose commands all exit with code 1.
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            success: false,
        }
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

impl Executor for RecordingExecutor {
    fn run_in(
        &self,
        dir: &Path,
        program: &str,
        args: &[&'static str],
        output: OutputMode,
    ) -> anyhow::Result<ExecResult> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(RecordedCall {
                dir: dir.to_path_buf(),
                program: program.to_string(),
                args: args.iter().map(ToString::to_string).collect(),
                output,
            });
        Ok(ExecResult {
            success: self.success,
            code: Some(i32::from(!self.success)),
        })
    }

    fn which(&self, _program: &str) -> bool {
        true
    }
}
