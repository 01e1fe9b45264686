//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the materializer can be
//! unit-tested without touching the real filesystem.  Production code uses
//! [`SystemFileSystemOps`]; tests use `MemoryFileSystem`.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries and mutations the materializer needs.
///
/// Implement this trait to swap in a fake during unit tests, keeping the
/// decision logic independent of real I/O.  The production implementation is
/// [`SystemFileSystemOps`].
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if something exists at `path`, including a symlink whose
    /// target is missing.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` itself is a symbolic link (or a Windows
    /// junction).  The link is not followed.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory, following symbolic links.
    fn is_dir(&self, path: &Path) -> bool;

    /// Resolve `path` to an absolute path with every link followed.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` (or a link target on the way) does not
    /// exist.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Read the whole file at `path` as UTF-8 text, following symbolic links.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns the immediate child paths inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Create `path` and any missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy the bytes of `from` to `to`, overwriting `to` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` cannot be read or `to` cannot be written.
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Returns the target a symbolic link at `path` points to.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a link or cannot be read.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create a directory link at `link` pointing to `target`.  `target` need
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    fn create_dir_link(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Remove whatever is at `path`: a symlink is unlinked (never followed),
    /// a directory is removed recursively, and anything else is deleted.
    ///
    /// A missing `path` is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails for any reason other than `NotFound`.
    fn remove_all(&self, path: &Path) -> io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok_and(|m| is_link(&m))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        dunce::canonicalize(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.path()))
            .collect()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn create_dir_link(&self, target: &Path, link: &Path) -> io::Result<()> {
        make_dir_link(target, link)
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        let meta = match std::fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        let result = if is_link(&meta) {
            remove_link(path)
        } else if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Whether metadata obtained without following links describes a link.
fn is_link(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt as _;
        // FILE_ATTRIBUTE_REPARSE_POINT covers both symlinks and junctions.
        const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
        meta.is_symlink() || meta.file_attributes() & FILE_ATTRIBUTE_REPARSE_POINT != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_symlink()
    }
}

/// Unlink a symlink without touching its target.
///
/// Directory symlinks and junctions on Windows need `remove_dir`; everywhere
/// else `remove_file` unlinks the link itself.
fn remove_link(path: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        std::fs::remove_dir(path).or_else(|_| std::fs::remove_file(path))
    }
    #[cfg(not(windows))]
    {
        std::fs::remove_file(path)
    }
}

/// Create a directory link.  On Windows a junction is made through
/// `mklink /J` when the symlink API is refused (no developer mode).
fn make_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }
    #[cfg(windows)]
    {
        if std::os::windows::fs::symlink_dir(target, link).is_ok() {
            return Ok(());
        }
        let status = std::process::Command::new("cmd")
            .args(["/c", "mklink", "/J"])
            .arg(link)
            .arg(target)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "mklink /J {} {} failed",
                link.display(),
                target.display()
            )))
        }
    }
}

/// A node in the [`MemoryFileSystem`] tree.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNode {
    /// A directory.
    Dir,
    /// A regular file with its contents.
    File(Vec<u8>),
    /// A symbolic link pointing at an absolute path.
    Symlink(PathBuf),
}

/// A mutation recorded by [`MemoryFileSystem`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsOp {
    /// `create_dir_all` was called.
    CreateDir(PathBuf),
    /// `copy_file` was called with `(from, to)`.
    Copy(PathBuf, PathBuf),
    /// `remove_all` was called.
    Remove(PathBuf),
    /// `create_dir_link` was called with `(target, link)`.
    Link(PathBuf, PathBuf),
}

/// In-memory [`FileSystemOps`] for unit tests.
///
/// Pre-configure directories, files, and symlinks with the builder-style
/// methods, then pass the filesystem to the materializer.  Every mutation is
/// appended to a journal that tests inspect with [`ops`](Self::ops).
///
/// Paths are compared literally, so tests should build them with the same
/// `join` calls the code under test uses.
///
/// # Example
///
/// ```ignore
/// let fs = MemoryFileSystem::new()
///     .with_file("/repo/package.json", "{}")
///     .with_symlink("/repo/node_modules/lib", "/libs/lib");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: std::sync::Mutex<std::collections::BTreeMap<PathBuf, MemoryNode>>,
    journal: std::sync::Mutex<Vec<FsOp>>,
    fail_copies_from: Vec<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MemoryFileSystem {
    /// Create an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_parents(&self, path: &Path) {
        let mut nodes = self.nodes.lock().expect("mock nodes poisoned");
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(MemoryNode::Dir);
        }
    }

    fn insert(&self, path: PathBuf, node: MemoryNode) {
        self.insert_parents(&path);
        self.nodes
            .lock()
            .expect("mock nodes poisoned")
            .insert(path, node);
    }

    /// Add a directory (and its ancestors).
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.insert(path.into(), MemoryNode::Dir);
        self
    }

    /// Add a regular file (and its ancestor directories).
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path.into(), MemoryNode::File(contents.into()));
        self
    }

    /// Add a symbolic link at `path` pointing to `target`.
    #[must_use]
    pub fn with_symlink(self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        self.insert(path.into(), MemoryNode::Symlink(target.into()));
        self
    }

    /// Make every `copy_file` whose source lies under `root` fail.
    #[must_use]
    pub fn failing_copies_from(mut self, root: impl Into<PathBuf>) -> Self {
        self.fail_copies_from.push(root.into());
        self
    }

    /// Return the node at `path`, if any.
    pub fn node(&self, path: impl AsRef<Path>) -> Option<MemoryNode> {
        self.nodes
            .lock()
            .expect("mock nodes poisoned")
            .get(path.as_ref())
            .cloned()
    }

    /// Return all mutations performed so far, in order.
    pub fn ops(&self) -> Vec<FsOp> {
        self.journal.lock().expect("mock journal poisoned").clone()
    }

    /// Forget previously recorded mutations.
    pub fn clear_ops(&self) {
        self.journal.lock().expect("mock journal poisoned").clear();
    }

    fn record(&self, op: FsOp) {
        self.journal.lock().expect("mock journal poisoned").push(op);
    }

    /// Follow symlinks in every component of `path` and return the real
    /// path with its node, or `None` if nothing exists there.
    fn resolve(&self, path: &Path) -> Option<(PathBuf, MemoryNode)> {
        let nodes = self.nodes.lock().expect("mock nodes poisoned");
        let mut current = PathBuf::new();
        let mut hops = 0;
        for component in path.components() {
            current.push(component);
            while let Some(MemoryNode::Symlink(target)) = nodes.get(&current) {
                hops += 1;
                if hops > 32 {
                    return None;
                }
                current = target.clone();
            }
        }
        nodes.get(&current).map(|node| (current.clone(), node.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl FileSystemOps for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(MemoryNode::Symlink(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some((_, MemoryNode::Dir)))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.resolve(path)
            .map(|(real, _)| real)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let Some((_, MemoryNode::File(bytes))) = self.resolve(path) else {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        };
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let Some((real, MemoryNode::Dir)) = self.resolve(path) else {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        };
        let nodes = self.nodes.lock().expect("mock nodes poisoned");
        Ok(nodes
            .keys()
            .filter(|p| p.parent() == Some(real.as_path()))
            .filter_map(|p| p.file_name().map(|name| path.join(name)))
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.record(FsOp::CreateDir(path.to_path_buf()));
        if matches!(self.node(path), Some(MemoryNode::File(_))) {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        self.insert(path.to_path_buf(), MemoryNode::Dir);
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(FsOp::Copy(from.to_path_buf(), to.to_path_buf()));
        if self.fail_copies_from.iter().any(|root| from.starts_with(root)) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let Some((_, MemoryNode::File(bytes))) = self.resolve(from) else {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        };
        let parent_is_dir = to
            .parent()
            .is_some_and(|p| matches!(self.node(p), Some(MemoryNode::Dir)));
        if !parent_is_dir {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        self.nodes
            .lock()
            .expect("mock nodes poisoned")
            .insert(to.to_path_buf(), MemoryNode::File(bytes));
        Ok(())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        match self.node(path) {
            Some(MemoryNode::Symlink(target)) => Ok(target),
            Some(_) => Err(io::Error::from(io::ErrorKind::InvalidInput)),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn create_dir_link(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.record(FsOp::Link(target.to_path_buf(), link.to_path_buf()));
        if self.exists(link) {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        self.insert(link.to_path_buf(), MemoryNode::Symlink(target.to_path_buf()));
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        self.record(FsOp::Remove(path.to_path_buf()));
        let mut nodes = self.nodes.lock().expect("mock nodes poisoned");
        let is_link = matches!(nodes.get(path), Some(MemoryNode::Symlink(_)));
        nodes.remove(path);
        if !is_link {
            nodes.retain(|p, _| !p.starts_with(path));
        }
        Ok(())
    }
}
