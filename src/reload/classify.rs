//! Build Classification
//!
//! Pure decision logic: given one completed build, decide whether clients
//! need nothing, a narrow unit reload, or a full restart.
//! No I/O, no actor machinery. Paths are compared exactly as given, so
//! callers normalize them at ingestion.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::tracker::HashTracker;

/// One compiled unit as reported by the build pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitBuild {
    /// Stable unit identifier (entry / chunk name)
    pub id: String,
    /// Opaque content hash of the compiled output
    pub hash: String,
    /// Source files compiled into this unit
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl UnitBuild {
    pub fn new(id: impl Into<String>, hash: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            id: id.into(),
            hash: hash.into(),
            files,
        }
    }
}

/// Snapshot of one completed build.
#[derive(Debug, Clone, Default)]
pub struct BuildEvent {
    /// Files touched since the previous emitted notification
    pub changed_files: FxHashSet<PathBuf>,
    /// Every unit present in this build, in pipeline order
    pub units: Vec<UnitBuild>,
}

impl BuildEvent {
    pub fn new(changed_files: FxHashSet<PathBuf>, units: Vec<UnitBuild>) -> Self {
        Self {
            changed_files,
            units,
        }
    }

    /// Whether any file attributed to `unit` is among the changed files.
    fn touches(&self, unit: &UnitBuild) -> bool {
        unit.files.iter().any(|f| self.changed_files.contains(f))
    }
}

/// Outcome of classifying a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Nothing clients care about changed
    NoOp,
    /// A reload-relevant unit changed
    UnitReload(String),
    /// A restart-trigger file changed (the path that fired)
    FullRestart(PathBuf),
}

impl Classification {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// Short human-readable description for status output.
    pub fn describe(&self) -> String {
        match self {
            Self::NoOp => "no reload needed".to_string(),
            Self::UnitReload(id) => format!("reload contentScripts: {id}"),
            Self::FullRestart(path) => format!("restart, {} changed", path.display()),
        }
    }
}

/// Decides the reload class for each completed build.
///
/// Owns the [`HashTracker`], so it must see every build in order.
#[derive(Debug)]
pub struct ChangeClassifier {
    tracker: HashTracker,
    /// Files whose change forces a full restart (e.g. manifest.json)
    restart_triggers: Vec<PathBuf>,
    /// Units clients know how to reload individually
    reload_relevant: FxHashSet<String>,
}

impl ChangeClassifier {
    pub fn new(restart_triggers: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            tracker: HashTracker::new(),
            restart_triggers: restart_triggers.into_iter().collect(),
            reload_relevant: FxHashSet::default(),
        }
    }

    /// Set the initial reload-relevant unit ids.
    #[cfg(test)]
    pub fn with_reload_relevant(mut self, units: impl IntoIterator<Item = String>) -> Self {
        self.set_reload_relevant(units);
        self
    }

    /// Replace the reload-relevant unit ids (entries may appear between builds).
    pub fn set_reload_relevant(&mut self, units: impl IntoIterator<Item = String>) {
        self.reload_relevant = units.into_iter().collect();
    }

    pub fn is_reload_relevant(&self, unit_id: &str) -> bool {
        self.reload_relevant.contains(unit_id)
    }

    /// Classify one build.
    ///
    /// Precedence:
    /// 1. a changed restart trigger wins unconditionally (hashes are not
    ///    observed for that build)
    /// 2. the first unit, in pipeline order, that changed hash, is reload
    ///    relevant and has an attributed file among the changed files
    /// 3. otherwise nothing
    ///
    /// Every unit is observed even after a match, so the next build compares
    /// against this build's hashes.
    pub fn classify(&mut self, event: &BuildEvent) -> Classification {
        if let Some(trigger) = self.changed_trigger(event) {
            return Classification::FullRestart(trigger.to_path_buf());
        }

        let mut first_match = None;
        for unit in &event.units {
            let changed = self.tracker.observe(&unit.id, &unit.hash);
            if first_match.is_some() || !changed {
                continue;
            }
            if !self.is_reload_relevant(&unit.id) {
                crate::debug!("reload"; "unit {} changed but is not reloadable", unit.id);
                continue;
            }
            if event.touches(unit) {
                first_match = Some(unit.id.clone());
            } else {
                // Typically shared-chunk renumbering: hash moved, sources did not
                crate::debug!("reload"; "unit {} hash changed without source change", unit.id);
            }
        }

        first_match.map_or(Classification::NoOp, Classification::UnitReload)
    }

    fn changed_trigger(&self, event: &BuildEvent) -> Option<&Path> {
        self.restart_triggers
            .iter()
            .find(|p| event.changed_files.contains(*p))
            .map(PathBuf::as_path)
    }
}
