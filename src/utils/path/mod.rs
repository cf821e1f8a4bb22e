//! Path utilities.
//!
//! Pure functions for path manipulation.

pub mod fs;

pub use fs::{normalize_path, resolve_path};
