//! `[build]` section: where build results come from.
//!
//! ```toml
//! [build]
//! stats = "dist/stats.json"   # webpack stats written after every build
//! watch = true                # watch entry sources and the stats file
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::path::resolve_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Stats file parsed on every change
    pub stats: Option<PathBuf>,
    /// Watch sources for changed-file signals
    pub watch: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            stats: None,
            watch: true,
        }
    }
}

impl BuildConfig {
    pub(crate) fn normalize(&mut self, root: &Path) {
        if let Some(stats) = self.stats.take() {
            self.stats = Some(resolve_path(&stats, root));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert!(config.build.watch);
        assert!(config.build.stats.is_none());
    }

    #[test]
    fn test_build_section() {
        let config = test_parse_config("[build]\nstats = \"dist/stats.json\"\nwatch = false");
        assert_eq!(config.build.stats, Some(PathBuf::from("dist/stats.json")));
        assert!(!config.build.watch);
    }
}
