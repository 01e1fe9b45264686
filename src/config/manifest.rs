//! `package.json` loading and dependency-group merging.
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::FILE_PREFIX;
use crate::error::ManifestError;
use crate::operations::FileSystemOps;

/// The dependency groups of a parsed `package.json`.
///
/// All other manifest fields are ignored.  Each group preserves the order in
/// which names appear in the document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Manifest {
    /// Runtime dependencies.
    pub dependencies: IndexMap<String, String>,
    /// Development dependencies.
    pub dev_dependencies: IndexMap<String, String>,
    /// Peer dependencies.
    pub peer_dependencies: IndexMap<String, String>,
    /// Optional dependencies.
    pub optional_dependencies: IndexMap<String, String>,
}

/// A single `(name, specifier)` pair from the merged dependency groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Package name, possibly scoped (`@scope/name`).
    pub name: String,
    /// Version specifier exactly as written in the manifest.
    pub specifier: String,
}

impl DependencySpec {
    /// The relative path of a `file:` specifier, or `None` for registry
    /// ranges, git URLs, and every other form.
    ///
    /// # Examples
    ///
    /// ```
    /// use materialize_cli::config::manifest::DependencySpec;
    ///
    /// let local = DependencySpec { name: "a".into(), specifier: "file:../a".into() };
    /// assert_eq!(local.local_path(), Some("../a"));
    ///
    /// let remote = DependencySpec { name: "b".into(), specifier: "^1.2.0".into() };
    /// assert_eq!(remote.local_path(), None);
    /// ```
    #[must_use]
    pub fn local_path(&self) -> Option<&str> {
        self.specifier.strip_prefix(FILE_PREFIX)
    }

    /// Resolve the source tree of a `file:` specifier against `root`.
    #[must_use]
    pub fn source_dir(&self, root: &Path) -> Option<PathBuf> {
        self.local_path().map(|rel| root.join(rel))
    }
}

impl Manifest {
    /// Parse manifest JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error if `content` is not a JSON object
    /// whose dependency groups map names to strings.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Merge the four dependency groups into one ordered list.
    ///
    /// Later groups override earlier ones on name collision, in the order
    /// dependencies, devDependencies, peerDependencies, optionalDependencies.
    /// A name keeps the position where it first appeared.
    #[must_use]
    pub fn merged_dependencies(&self) -> Vec<DependencySpec> {
        let mut merged: IndexMap<&str, &str> = IndexMap::new();
        for group in [
            &self.dependencies,
            &self.dev_dependencies,
            &self.peer_dependencies,
            &self.optional_dependencies,
        ] {
            for (name, specifier) in group {
                merged.insert(name.as_str(), specifier.as_str());
            }
        }
        merged
            .into_iter()
            .map(|(name, specifier)| DependencySpec {
                name: name.to_string(),
                specifier: specifier.to_string(),
            })
            .collect()
    }

    /// Merged dependencies whose specifier is a `file:` reference.
    #[must_use]
    pub fn local_dependencies(&self) -> Vec<DependencySpec> {
        self.merged_dependencies()
            .into_iter()
            .filter(|dep| dep.local_path().is_some())
            .collect()
    }
}

/// Load the manifest at `path` through `fs`.
///
/// # Errors
///
/// Returns [`ManifestError::NotFound`] if the file is absent,
/// [`ManifestError::Read`] if it cannot be read, and [`ManifestError::Parse`]
/// if it is not a valid manifest.
pub fn load(fs: &dyn FileSystemOps, path: &Path) -> Result<Manifest, ManifestError> {
    let content = fs.read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ManifestError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Manifest::from_json(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
