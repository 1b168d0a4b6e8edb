//! The package index: name interning, `Pkg` records, and compiled
//! dependency resolution.

pub mod compdep;
pub mod index;
pub mod pkg;

pub use compdep::CompDep;
pub use index::BinIndex;
pub use pkg::{NameTable, Pkg, RawDep};
