//! Idempotent primitives the materialization pass is built from.
//!
//! - [`store_entry`]: inspect and replace one `node_modules/<name>` entry
//! - [`fs`]: recursive tree copy over the filesystem port
//! - [`install`]: scoped `npm install` inside a copied package
pub mod fs;
pub mod install;
pub mod store_entry;
