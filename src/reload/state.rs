//! Watch-loop state.
//!
//! Accumulates changed paths between build completions and tracks whether a
//! classification is pending.
//!
//! ```text
//!            files_changed
//!   Idle ───────────────────> PendingClassification
//!    ^                              │ build completed
//!    └──── notification emitted ────┘ (NoOp keeps the pending set)
//! ```

use std::path::PathBuf;

use rustc_hash::FxHashSet;

use super::classify::{BuildEvent, UnitBuild};

/// Coordinator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    /// Nothing waiting for a build
    Idle,
    /// Changed files are waiting for the next build completion
    PendingClassification,
}

/// Pending change set plus phase.
#[derive(Debug)]
pub struct WatchState {
    phase: WatchPhase,
    pending: FxHashSet<PathBuf>,
}

impl Default for WatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchState {
    pub fn new() -> Self {
        Self {
            phase: WatchPhase::Idle,
            pending: FxHashSet::default(),
        }
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    pub fn pending(&self) -> &FxHashSet<PathBuf> {
        &self.pending
    }

    /// Union newly changed paths into the pending set.
    pub fn files_changed(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        let mut seen_any = false;
        for path in paths {
            seen_any = true;
            self.pending.insert(path);
        }
        if seen_any {
            self.phase = WatchPhase::PendingClassification;
        }
    }

    /// Build the event for a completed build from the current pending set.
    pub fn snapshot(&self, units: Vec<UnitBuild>) -> BuildEvent {
        BuildEvent::new(self.pending.clone(), units)
    }

    /// Apply the outcome of classifying the last snapshot.
    ///
    /// The owning actor handles one pipeline event at a time, so nothing can
    /// arrive between [`snapshot`](Self::snapshot) and this call.
    ///
    /// - `emitted`: the pending set is consumed.
    /// - not emitted: the pending set is kept, since the build may not have
    ///   reflected those files yet.
    pub fn settle(&mut self, emitted: bool) {
        if emitted {
            self.pending.clear();
        }
        self.phase = WatchPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_starts_idle() {
        let state = WatchState::new();
        assert_eq!(state.phase(), WatchPhase::Idle);
        assert!(state.pending().is_empty());
    }

    #[test]
    fn test_files_changed_accumulates() {
        let mut state = WatchState::new();
        state.files_changed(paths(&["/a.ts"]));
        state.files_changed(paths(&["/b.ts", "/a.ts"]));

        assert_eq!(state.phase(), WatchPhase::PendingClassification);
        assert_eq!(state.pending().len(), 2);
    }

    #[test]
    fn test_empty_change_keeps_idle() {
        let mut state = WatchState::new();
        state.files_changed(Vec::new());
        assert_eq!(state.phase(), WatchPhase::Idle);
    }

    #[test]
    fn test_emitted_clears_pending() {
        let mut state = WatchState::new();
        state.files_changed(paths(&["/a.ts"]));

        let _event = state.snapshot(vec![]);
        state.settle(true);

        assert_eq!(state.phase(), WatchPhase::Idle);
        assert!(state.pending().is_empty());
    }

    #[test]
    fn test_noop_keeps_pending_but_goes_idle() {
        let mut state = WatchState::new();
        state.files_changed(paths(&["/a.ts"]));

        let _event = state.snapshot(vec![]);
        state.settle(false);

        assert_eq!(state.phase(), WatchPhase::Idle);
        assert_eq!(state.pending().len(), 1);

        state.files_changed(paths(&["/b.ts"]));
        assert_eq!(state.phase(), WatchPhase::PendingClassification);
        assert_eq!(state.pending().len(), 2);
    }

    #[test]
    fn test_snapshot_matches_pending() {
        let mut state = WatchState::new();
        state.files_changed(paths(&["/a.ts", "/b.ts"]));
        let event = state.snapshot(vec![UnitBuild::new("contentA", "h1", vec![])]);
        assert_eq!(&event.changed_files, state.pending());
        assert_eq!(event.units.len(), 1);
    }
}
