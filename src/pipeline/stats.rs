//! Webpack-style stats file.
//!
//! Only the fields needed for classification are read:
//!
//! ```json
//! {
//!   "outputPath": "/ext/dist",
//!   "changedFiles": ["/ext/src/contentA/index.ts"],
//!   "chunks": [
//!     {
//!       "id": "contentA",
//!       "hash": "9f2c...",
//!       "files": ["contentA.js"],
//!       "modules": [{ "nameForCondition": "/ext/src/contentA/index.ts", "moduleType": "javascript/auto" }]
//!     }
//!   ]
//! }
//! ```
//!
//! Runtime modules are not attributed to a chunk. Numeric chunk ids are
//! kept as their decimal string.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{BuildReport, PipelineError, make_unit, resolve_all};
use crate::utils::path::resolve_path;

const RUNTIME_MODULE: &str = "runtime";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    #[serde(default)]
    output_path: Option<PathBuf>,
    #[serde(default)]
    changed_files: Vec<PathBuf>,
    #[serde(default)]
    chunks: Vec<Chunk>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChunkId {
    Name(String),
    Index(u64),
}

impl ChunkId {
    fn into_string(self) -> String {
        match self {
            Self::Name(name) => name,
            Self::Index(index) => index.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Chunk {
    id: ChunkId,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default)]
    modules: Vec<Module>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Module {
    #[serde(default)]
    name_for_condition: Option<PathBuf>,
    #[serde(default)]
    module_type: Option<String>,
}

impl Module {
    fn source(self) -> Option<PathBuf> {
        if self.module_type.as_deref() == Some(RUNTIME_MODULE) {
            return None;
        }
        self.name_for_condition
    }
}

/// Parse stats JSON.
///
/// `output_dir` is used to locate emitted files when the stats carry no
/// `outputPath`.
pub fn parse_stats(json: &str, root: &Path, output_dir: &Path) -> Result<BuildReport, PipelineError> {
    let stats: Stats = serde_json::from_str(json)?;
    let output_dir = stats
        .output_path
        .map(|p| resolve_path(&p, root))
        .unwrap_or_else(|| output_dir.to_path_buf());

    let units = stats
        .chunks
        .into_iter()
        .map(|chunk| {
            let outputs: Vec<_> = chunk.files.iter().map(|f| output_dir.join(f)).collect();
            let sources = chunk.modules.into_iter().filter_map(Module::source).collect();
            make_unit(chunk.id.into_string(), chunk.hash, sources, &outputs, root)
        })
        .collect();

    Ok(BuildReport {
        changed_files: resolve_all(stats.changed_files, root),
        units,
    })
}

/// Read and parse a stats file. Emitted files default to the stats file's directory.
pub fn read_stats(path: &Path, root: &Path) -> Result<BuildReport, PipelineError> {
    let json =
        std::fs::read_to_string(path).map_err(|e| PipelineError::Io(path.to_path_buf(), e))?;
    let output_dir = path.parent().unwrap_or(root);
    parse_stats(&json, root, output_dir)
}
