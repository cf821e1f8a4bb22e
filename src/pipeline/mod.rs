//! Build Pipeline Ingest
//!
//! The bundler is an external process. Its events reach the coordinator
//! through one of two sources:
//!
//! - `ndjson` - one JSON object per line on stdin
//! - `stats` - a webpack-style stats file rewritten after every build
//!
//! Both normalize every path against the project root on the way in, so the
//! classifier can compare paths without touching the filesystem.

pub mod ndjson;
pub mod stats;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::freshness::compute_files_hash;
use crate::reload::UnitBuild;
use crate::utils::path::resolve_path;

/// Something the build pipeline reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Source files changed; a build is (or will be) running
    FilesChanged(Vec<PathBuf>),
    /// A build finished
    BuildCompleted(BuildReport),
}

/// Per-build results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Changed files the pipeline attached to the completion itself
    pub changed_files: Vec<PathBuf>,
    /// Compiled units, in pipeline order
    pub units: Vec<UnitBuild>,
}

/// Ingest failures. Never fatal for the serve loop.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed pipeline message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolve a batch of reported paths against the project root.
pub(crate) fn resolve_all(paths: Vec<PathBuf>, root: &Path) -> Vec<PathBuf> {
    paths.iter().map(|p| resolve_path(p, root)).collect()
}

/// Build a [`UnitBuild`], hashing emitted files when the bundler gave no hash.
pub(crate) fn make_unit(
    id: String,
    hash: Option<String>,
    files: Vec<PathBuf>,
    outputs: &[PathBuf],
    root: &Path,
) -> UnitBuild {
    let hash = hash
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| compute_files_hash(outputs).to_hex());
    UnitBuild::new(id, hash, resolve_all(files, root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_unit_prefers_reported_hash() {
        let unit = make_unit(
            "contentA".into(),
            Some("abc".into()),
            vec![PathBuf::from("/ext/a.ts")],
            &[],
            Path::new("/ext"),
        );
        assert_eq!(unit.hash, "abc");
        assert_eq!(unit.files, vec![PathBuf::from("/ext/a.ts")]);
    }

    #[test]
    fn test_make_unit_hashes_outputs() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("contentA.js");
        std::fs::write(&out, "one").unwrap();

        let first = make_unit("contentA".into(), None, vec![], &[out.clone()], dir.path());
        std::fs::write(&out, "two").unwrap();
        let second = make_unit("contentA".into(), Some(String::new()), vec![], &[out], dir.path());

        assert_eq!(first.hash.len(), 64);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn test_resolve_all_joins_root() {
        let resolved = resolve_all(vec![PathBuf::from("src/a.ts")], Path::new("/ext"));
        assert_eq!(resolved, vec![PathBuf::from("/ext/src/a.ts")]);
    }
}
