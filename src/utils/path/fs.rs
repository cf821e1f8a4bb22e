//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - config paths relative to the project root, with tilde expansion

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// Deleted files cannot be canonicalized, so a path reported by the bundler
/// after removal still compares equal to the configured one as long as both
/// were spelled the same way.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a configured path against the project root.
///
/// Expands a leading `~`, joins relative paths with `root`, then normalizes.
/// Non-UTF-8 paths skip tilde expansion.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    let path = match path.to_str() {
        Some(text) => PathBuf::from(shellexpand::tilde(text).into_owned()),
        None => path.to_path_buf(),
    };
    let full_path = if path.is_relative() {
        root.join(&path)
    } else {
        path
    };
    normalize_path(&full_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/manifest.json");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("relative/path/manifest.json"));
    }

    #[test]
    fn test_resolve_path_relative_to_root() {
        let resolved = resolve_path(Path::new("src/manifest.json"), Path::new("/project"));
        assert_eq!(resolved, PathBuf::from("/project/src/manifest.json"));
    }

    #[test]
    fn test_resolve_path_absolute_kept() {
        let resolved = resolve_path(Path::new("/abs/manifest.json"), Path::new("/project"));
        assert_eq!(resolved, PathBuf::from("/abs/manifest.json"));
    }

    #[test]
    fn test_resolve_path_existing_file_canonicalized() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("manifest.json"), "{}").unwrap();
        let resolved = resolve_path(Path::new("manifest.json"), dir.path());
        assert_eq!(
            resolved,
            dir.path().canonicalize().unwrap().join("manifest.json")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_path_non_utf8_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"manifest-\xff.json");
        let resolved = resolve_path(Path::new(name), Path::new("/project"));
        assert_eq!(resolved, Path::new("/project").join(name));
    }
}
