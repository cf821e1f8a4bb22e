//! `[entry]` section and `manifest_path`.
//!
//! # Example
//!
//! ```toml
//! manifest_path = ["src/manifest.json", "src/_locales/en/messages.json"]
//!
//! [entry]
//! background = "src/background/index.ts"   # required
//! popup = "src/popup/index.tsx"
//! options = "src/options/index.tsx"
//! content_script_dir = "src/contentScripts"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::path::resolve_path;

/// Extension entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    /// Background script (required for `serve` and `entries`)
    pub background: Option<PathBuf>,
    /// Popup page script
    pub popup: Option<PathBuf>,
    /// Options page script
    pub options: Option<PathBuf>,
    /// Directory of content scripts, one per file or folder
    #[serde(alias = "contentScriptDirPath")]
    pub content_script_dir: Option<PathBuf>,
}

impl EntryConfig {
    pub(crate) fn normalize(&mut self, root: &Path) {
        for path in [
            &mut self.background,
            &mut self.popup,
            &mut self.options,
            &mut self.content_script_dir,
        ] {
            if let Some(p) = path.take() {
                *path = Some(resolve_path(&p, root));
            }
        }
    }
}

/// `manifest_path`: a single path or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestPath {
    #[default]
    None,
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl ManifestPath {
    /// All configured paths, in order.
    pub fn paths(&self) -> Vec<PathBuf> {
        match self {
            Self::None => Vec::new(),
            Self::One(path) => vec![path.clone()],
            Self::Many(paths) => paths.clone(),
        }
    }

    pub fn from_paths(mut paths: Vec<PathBuf>) -> Self {
        match paths.len() {
            0 => Self::None,
            1 => Self::One(paths.remove(0)),
            _ => Self::Many(paths),
        }
    }

    pub fn is_none(&self) -> bool {
        self.paths().is_empty()
    }

    pub(crate) fn normalize(&mut self, root: &Path) {
        let resolved = self.paths().iter().map(|p| resolve_path(p, root)).collect();
        *self = Self::from_paths(resolved);
    }
}
