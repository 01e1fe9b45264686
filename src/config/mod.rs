//! Run options and the well-known names of the npm project layout.
pub mod manifest;

/// File name of the package manifest at a project (or copied package) root.
pub const MANIFEST_FILE: &str = "package.json";

/// Directory holding installed dependencies, one entry per package name.
pub const STORE_DIR: &str = "node_modules";

/// Prefix marking a dependency specifier as a local file-path reference.
pub const FILE_PREFIX: &str = "file:";

/// Package manager invoked for the scoped install step.
pub const INSTALL_PROGRAM: &str = "npm";

/// Options for a single materialization run.
///
/// Produced by the CLI layer; every field defaults to `false`.
///
/// # Examples
///
/// ```
/// use materialize_cli::config::MaterializeOptions;
///
/// let opts = MaterializeOptions::default();
/// assert!(!opts.silent && !opts.skip_install && !opts.include_dev);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeOptions {
    /// Suppress all log output and the install command's own output.
    pub silent: bool,
    /// Copy store entries but never run the install command.
    pub skip_install: bool,
    /// Install development dependencies inside each copy as well.
    pub include_dev: bool,
}
