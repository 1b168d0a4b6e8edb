//! Core types and utilities shared across the mmpack workspace.
//!
//! This crate provides foundations used by every other mmpack crate:
//! - the error model (`error`)
//! - ordered-string version comparison and range matching (`version`)
//! - system-dependency ("sysdep") presence checks (`sysdeps`)
//! - thin YAML (de)serialization helpers (`yaml`)

pub mod error;
pub mod sysdeps;
pub mod version;
pub mod yaml;

pub use error::{Error, ErrorCode, Result};
pub use version::{Version, VersionConstraint};
