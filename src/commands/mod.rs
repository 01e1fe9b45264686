//! Top-level command orchestration.
pub mod materialize;
