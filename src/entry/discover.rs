//! Content script discovery.
//!
//! ```text
//! contentScripts/
//! ├── inject.ts          → "inject"
//! ├── sidebar/
//! │   ├── index.tsx      → "sidebar"
//! │   └── panel.tsx      (not an entry)
//! └── deep/a/index.ts    (too deep, ignored)
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use jwalk::WalkDir;
use regex::Regex;

static SCRIPT_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.(ts|tsx|js|jsx|vue)$").unwrap());

static INDEX_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^index\.(ts|tsx|js|jsx|vue)$").unwrap());

/// A content script entry found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentScript {
    /// Entry name (also the bundler's unit id)
    pub name: String,
    pub path: PathBuf,
}

/// Discover content scripts in `dir`, ordered by relative path.
///
/// When both `name.ts` and `name/index.ts` exist the later one in path order
/// wins and keeps the earlier position.
pub fn discover_content_scripts(dir: &Path) -> Vec<ContentScript> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut matches: Vec<(PathBuf, String)> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.path();
            entry_name(dir, &path).map(|name| (path, name))
        })
        .collect();
    matches.sort_by(|(a, _), (b, _)| a.as_os_str().cmp(b.as_os_str()));

    let mut found: Vec<ContentScript> = Vec::new();
    for (path, name) in matches {
        match found.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.path = path,
            None => found.push(ContentScript { name, path }),
        }
    }

    found
}

/// Names of the scripts in `dir`.
pub fn content_script_names(dir: &Path) -> Vec<String> {
    discover_content_scripts(dir)
        .into_iter()
        .map(|s| s.name)
        .collect()
}

fn entry_name(dir: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(dir).ok()?;
    let parts: Vec<&str> = rel.iter().filter_map(|c| c.to_str()).collect();

    match parts.as_slice() {
        [file] => SCRIPT_FILE
            .captures(file)
            .map(|caps| caps[1].to_string()),
        [folder, file] if INDEX_FILE.is_match(file) => Some((*folder).to_string()),
        _ => None,
    }
}
