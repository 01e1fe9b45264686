//! Recursive directory copy over the [`FileSystemOps`] port.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::operations::FileSystemOps;

/// Recursively copy the directory tree at `src` into `dst`.
///
/// `dst` (and any missing ancestors) is created first, so every directory
/// exists before the first file is copied into it.  Existing files in `dst`
/// are overwritten; extra files already present are left alone.
///
/// Symlinks within the source tree are *followed*: [`FileSystemOps::is_dir`]
/// follows links, so directory symlinks are recursed into and materialised,
/// and file symlinks have their target's contents copied.  A directory link
/// that resolves to a directory already being copied (for example
/// `self -> .`) would never terminate and is skipped.
///
/// # Errors
///
/// Returns an error naming the failing path if the destination directory
/// cannot be created, a source directory cannot be read, or a file cannot be
/// copied.  The walk stops at the first failure.
pub fn copy_tree(fs: &dyn FileSystemOps, src: &Path, dst: &Path) -> Result<()> {
    let mut ancestors = Vec::new();
    copy_dir(fs, src, dst, &mut ancestors)
}

/// `ancestors` holds the canonical paths of the source directories on the
/// current recursion path.
fn copy_dir(
    fs: &dyn FileSystemOps,
    src: &Path,
    dst: &Path,
    ancestors: &mut Vec<PathBuf>,
) -> Result<()> {
    fs.create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;
    let entries = fs
        .read_dir(src)
        .with_context(|| format!("reading directory {}", src.display()))?;
    let canonical = fs.canonicalize(src).ok();
    if let Some(path) = &canonical {
        ancestors.push(path.clone());
    }
    for src_path in entries {
        let Some(name) = src_path.file_name() else {
            continue;
        };
        let dst_path = dst.join(name);
        if fs.is_dir(&src_path) {
            if fs.is_symlink(&src_path)
                && fs
                    .canonicalize(&src_path)
                    .is_ok_and(|target| ancestors.contains(&target))
            {
                continue;
            }
            copy_dir(fs, &src_path, &dst_path, ancestors)?;
        } else {
            fs.copy_file(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }
    if canonical.is_some() {
        ancestors.pop();
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::{FsOp, MemoryFileSystem, MemoryNode, SystemFileSystemOps};
    use std::path::PathBuf;

    #[test]
    fn copies_files_and_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("a.txt"), b"aaa").unwrap();
        std::fs::create_dir(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("sub/b.txt"), b"bbb").unwrap();

        let target = dst.path().join("out");
        copy_tree(&SystemFileSystemOps, src.path(), &target).unwrap();

        assert_eq!(std::fs::read(target.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(std::fs::read(target.join("sub/b.txt")).unwrap(), b"bbb");
    }

    #[test]
    fn creates_missing_destination_ancestors() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("index.js"), "module.exports = 1;").unwrap();

        let target = dst.path().join("node_modules/@scope/pkg");
        copy_tree(&SystemFileSystemOps, src.path(), &target).unwrap();

        assert!(target.join("index.js").is_file());
    }

    #[test]
    fn overwrites_existing_destination_files() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "new").unwrap();
        std::fs::write(dst.path().join("a.txt"), "old").unwrap();

        copy_tree(&SystemFileSystemOps, src.path(), dst.path()).unwrap();

        assert_eq!(std::fs::read_to_string(dst.path().join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn copies_empty_directories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("empty/nested")).unwrap();

        let target = dst.path().join("out");
        copy_tree(&SystemFileSystemOps, src.path(), &target).unwrap();

        assert!(target.join("empty/nested").is_dir());
    }

    #[test]
    fn missing_source_is_an_error_naming_the_path() {
        let dst = tempfile::tempdir().unwrap();
        let missing = dst.path().join("does-not-exist");
        let err = copy_tree(&SystemFileSystemOps, &missing, &dst.path().join("out")).unwrap_err();
        assert!(
            format!("{err:#}").contains("does-not-exist"),
            "error should name the source: {err:#}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinks_inside_source_tree() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("shared.js"), "shared").unwrap();
        std::fs::create_dir(outside.path().join("dir")).unwrap();
        std::fs::write(outside.path().join("dir/inner.js"), "inner").unwrap();

        let src = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("shared.js"), src.path().join("file-link"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path().join("dir"), src.path().join("dir-link"))
            .unwrap();

        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("out");
        copy_tree(&SystemFileSystemOps, src.path(), &target).unwrap();

        let file_meta = std::fs::symlink_metadata(target.join("file-link")).unwrap();
        assert!(file_meta.is_file(), "file symlink should be copied as a file");
        let dir_meta = std::fs::symlink_metadata(target.join("dir-link")).unwrap();
        assert!(dir_meta.is_dir(), "dir symlink should become a real directory");
        assert_eq!(
            std::fs::read_to_string(target.join("dir-link/inner.js")).unwrap(),
            "inner"
        );
    }

    #[test]
    fn directory_is_created_before_its_files_are_copied() {
        let fs = MemoryFileSystem::new()
            .with_file("/src/index.js", "index")
            .with_file("/src/lib/helper.js", "helper")
            .with_file("/src/package.json", "{}");

        copy_tree(&fs, Path::new("/src"), Path::new("/dst")).unwrap();

        let ops = fs.ops();
        let lib_created = ops
            .iter()
            .position(|op| *op == FsOp::CreateDir(PathBuf::from("/dst/lib")))
            .expect("lib should be created");
        let helper_copied = ops
            .iter()
            .position(|op| {
                *op == FsOp::Copy(
                    PathBuf::from("/src/lib/helper.js"),
                    PathBuf::from("/dst/lib/helper.js"),
                )
            })
            .expect("helper.js should be copied");
        assert!(lib_created < helper_copied);

        assert_eq!(
            fs.node("/dst/index.js"),
            Some(MemoryNode::File(b"index".to_vec()))
        );
        assert_eq!(
            fs.node("/dst/lib/helper.js"),
            Some(MemoryNode::File(b"helper".to_vec()))
        );
        assert_eq!(
            fs.node("/dst/package.json"),
            Some(MemoryNode::File(b"{}".to_vec()))
        );
    }

    #[cfg(unix)]
    #[test]
    fn link_back_to_an_ancestor_is_skipped() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("index.js"), "index").unwrap();
        std::fs::create_dir(src.path().join("lib")).unwrap();
        std::os::unix::fs::symlink(".", src.path().join("self")).unwrap();
        std::os::unix::fs::symlink("..", src.path().join("lib/up")).unwrap();

        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("out");
        copy_tree(&SystemFileSystemOps, src.path(), &target).unwrap();

        assert!(target.join("index.js").is_file());
        assert!(target.join("lib").is_dir());
        assert!(!target.join("self").exists());
        assert!(!target.join("lib/up").exists());
    }

    #[test]
    fn cyclic_link_in_memory_is_skipped_but_siblings_are_linked_dirs() {
        let fs = MemoryFileSystem::new()
            .with_file("/src/a.js", "a")
            .with_file("/shared/b.js", "b")
            .with_symlink("/src/self", "/src")
            .with_symlink("/src/shared", "/shared");

        copy_tree(&fs, Path::new("/src"), Path::new("/dst")).unwrap();

        assert_eq!(fs.node("/dst/self"), None);
        assert_eq!(
            fs.node("/dst/shared/b.js"),
            Some(MemoryNode::File(b"b".to_vec()))
        );
    }

    #[test]
    fn stops_at_first_copy_failure() {
        let fs = MemoryFileSystem::new()
            .with_file("/src/a.js", "a")
            .failing_copies_from("/src");

        let err = copy_tree(&fs, Path::new("/src"), Path::new("/dst")).unwrap_err();

        assert!(format!("{err:#}").contains("copying /src/a.js to /dst/a.js"));
    }
}
