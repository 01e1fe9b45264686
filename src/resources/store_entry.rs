//! Store entry resource: one `node_modules/<name>` location.
use std::path::{Path, PathBuf};

use super::fs::copy_tree;
use crate::config::STORE_DIR;
use crate::error::CopyError;
use crate::operations::FileSystemOps;

/// Observed state of a store entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEntryState {
    /// Nothing exists at the entry path; the dependency was never installed.
    Missing,
    /// The entry is a symbolic link and should be materialized.
    Symlink,
    /// The entry is a real directory (or other non-link entry); left untouched.
    Materialized,
}

/// A dependency's location inside the project's dependency store, paired
/// with the source tree its `file:` specifier points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// Package name.
    pub name: String,
    /// Source tree the copy is taken from.
    pub source: PathBuf,
    /// `<root>/node_modules/<name>`.
    pub path: PathBuf,
}

impl StoreEntry {
    /// Build the store entry for `name` under the project `root`.
    #[must_use]
    pub fn new(root: &Path, name: &str, source: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            source,
            path: root.join(STORE_DIR).join(name),
        }
    }

    /// Human-readable description of this entry.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} <- {}", self.path.display(), self.source.display())
    }

    /// Inspect the entry without following a link at its path.
    #[must_use]
    pub fn current_state(&self, fs: &dyn FileSystemOps) -> StoreEntryState {
        if !fs.exists(&self.path) {
            StoreEntryState::Missing
        } else if fs.is_symlink(&self.path) {
            StoreEntryState::Symlink
        } else {
            StoreEntryState::Materialized
        }
    }

    /// Remove whatever occupies the entry and copy the source tree in its
    /// place.
    ///
    /// The source tree itself is never modified.  If the copy fails, the
    /// partial directory is removed and the original link is recreated, so
    /// the next run still sees a symlink and retries instead of treating a
    /// broken copy as materialized.
    ///
    /// # Errors
    ///
    /// Returns [`CopyError::Remove`] if the existing entry cannot be removed,
    /// [`CopyError::Tree`] if the copy fails part-way, and
    /// [`CopyError::NotRestored`] if the rollback after a failed copy fails too.
    pub fn replace_with_copy(&self, fs: &dyn FileSystemOps) -> Result<(), CopyError> {
        let link_target = fs.read_link(&self.path).ok();
        fs.remove_all(&self.path).map_err(|source| CopyError::Remove {
            path: self.path.clone(),
            source,
        })?;
        let Err(cause) = copy_tree(fs, &self.source, &self.path) else {
            return Ok(());
        };
        match self.restore(fs, link_target.as_deref()) {
            Ok(()) => Err(CopyError::Tree {
                from: self.source.clone(),
                to: self.path.clone(),
                cause,
            }),
            Err(restore) => Err(CopyError::NotRestored {
                from: self.source.clone(),
                to: self.path.clone(),
                cause,
                restore,
            }),
        }
    }

    /// Drop a partial copy and put the original link back, if there was one.
    fn restore(&self, fs: &dyn FileSystemOps, link_target: Option<&Path>) -> std::io::Result<()> {
        fs.remove_all(&self.path)?;
        match link_target {
            Some(target) => fs.create_dir_link(target, &self.path),
            None => Ok(()),
        }
    }
}
