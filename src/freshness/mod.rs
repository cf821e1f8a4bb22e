//! Content-hash (blake3) freshness for emitted bundles.

mod hash;

pub use hash::compute_files_hash;
