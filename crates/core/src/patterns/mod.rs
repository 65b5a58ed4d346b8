//! Path patterns: globs and file roles
pub mod glob;
pub mod role;

pub use glob::{GlobPattern, GlobSet};
pub use role::{FileRole, RoleMatcher};
