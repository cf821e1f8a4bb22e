use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use notify::RecursiveMode;
use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::actor::messages::ReloadMsg;
use crate::config::ReloadConfig;
use crate::logger::status_error;
use crate::pipeline::{PipelineEvent, stats::read_stats};
use crate::utils::path::normalize_path;

/// Directory names never treated as sources.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git"];

/// What the watcher looks at and how changes are routed.
///
/// - anything under the project root: source changes, except the bundler
///   output directory, `node_modules` and dot-directories
/// - entry directories outside the root: source changes
/// - manifest files: source changes (restart triggers)
/// - stats file: build completion
#[derive(Debug, Clone)]
pub struct WatchTargets {
    root: PathBuf,
    /// Entry directories not already under `root`
    extra_dirs: Vec<PathBuf>,
    /// Directories under `root` whose changes are ignored
    excluded: Vec<PathBuf>,
    manifests: Vec<PathBuf>,
    stats: Option<PathBuf>,
}

impl WatchTargets {
    pub fn from_config(config: &ReloadConfig) -> Self {
        let root = normalize_path(&config.root);
        let stats = config.build.stats.as_deref().map(normalize_path);

        let entry = &config.entry;
        let mut extra_dirs: Vec<PathBuf> = [&entry.background, &entry.popup, &entry.options]
            .into_iter()
            .flatten()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .chain(entry.content_script_dir.iter().cloned())
            .map(|p| normalize_path(&p))
            .filter(|p| !p.starts_with(&root))
            .collect();
        extra_dirs.sort();
        extra_dirs.dedup();

        let mut excluded: Vec<PathBuf> = IGNORED_DIRS.iter().map(|d| root.join(d)).collect();
        // bundler output lives next to the stats file
        if let Some(out_dir) = stats.as_deref().and_then(Path::parent)
            && out_dir != root
            && out_dir.starts_with(&root)
        {
            excluded.push(out_dir.to_path_buf());
        }

        Self {
            root,
            extra_dirs,
            excluded,
            manifests: config
                .restart_triggers()
                .into_iter()
                .map(|p| normalize_path(&p))
                .collect(),
            stats,
        }
    }

    /// Roots handed to the watcher.
    ///
    /// The project root is watched flat and each of its subdirectories
    /// recursively, so excluded trees such as `node_modules` cost no watches.
    /// Single files are watched through their parent directory so that
    /// replace-by-rename writes are still seen.
    pub(super) fn roots(&self) -> Vec<(PathBuf, RecursiveMode)> {
        let mut roots = vec![(self.root.clone(), RecursiveMode::NonRecursive)];
        roots.extend(
            self.project_dirs()
                .into_iter()
                .chain(self.extra_dirs.iter().cloned())
                .map(|dir| (dir, RecursiveMode::Recursive)),
        );

        let file_parents = self
            .manifests
            .iter()
            .chain(self.stats.iter())
            .filter_map(|p| p.parent().map(Path::to_path_buf));
        for parent in file_parents {
            if !is_covered(&roots, &parent) {
                roots.push((parent, RecursiveMode::NonRecursive));
            }
        }
        roots
    }

    /// Direct subdirectories of the root that may hold sources.
    fn project_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.path())
            .filter(|dir| !self.is_excluded(dir))
            .collect();
        dirs.sort();
        dirs
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded.iter().any(|dir| path.starts_with(dir)) {
            return true;
        }
        path.strip_prefix(&self.root).is_ok_and(|rel| {
            rel.components().any(|c| {
                let name = c.as_os_str().to_string_lossy();
                name.starts_with('.') || IGNORED_DIRS.iter().any(|d| name == *d)
            })
        })
    }

    pub(super) fn is_stats(&self, path: &Path) -> bool {
        self.stats.as_deref() == Some(path)
    }

    pub(super) fn is_source(&self, path: &Path) -> bool {
        self.manifests.iter().any(|m| m == path)
            || self.extra_dirs.iter().any(|dir| path.starts_with(dir))
            || (path.starts_with(&self.root) && !self.is_excluded(path))
    }
}

/// Whether `dir` is already seen by one of `roots`.
fn is_covered(roots: &[(PathBuf, RecursiveMode)], dir: &Path) -> bool {
    roots.iter().any(|(root, mode)| {
        root == dir || (*mode == RecursiveMode::Recursive && dir.starts_with(root))
    })
}

/// Convert debounced changes to reload actor messages.
///
/// Source changes are reported before the build completion they may have
/// caused, so one debounce window can carry both.
pub(super) fn events_to_messages(
    changes: FxHashMap<PathBuf, ChangeKind>,
    targets: &WatchTargets,
) -> Vec<ReloadMsg> {
    let mut sources = Vec::new();
    let mut stats_written = false;

    for (path, kind) in changes {
        if targets.is_stats(&path) {
            stats_written |= kind != ChangeKind::Removed;
        } else if targets.is_source(&path) {
            crate::debug!("watch"; "{}: {}", kind.label(), path.display());
            sources.push(path);
        }
    }
    sources.sort();

    let mut messages = Vec::new();
    if !sources.is_empty() {
        messages.push(ReloadMsg::Pipeline(PipelineEvent::FilesChanged(sources)));
    }

    if stats_written && let Some(stats) = &targets.stats {
        match read_stats(stats, &targets.root) {
            Ok(report) => {
                messages.push(ReloadMsg::Pipeline(PipelineEvent::BuildCompleted(report)))
            }
            Err(e) => status_error("failed to read build stats", &e.to_string()),
        }
    }

    messages
}
