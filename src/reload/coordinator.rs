//! Reload Coordinator
//!
//! Ties the pieces together for one build pipeline:
//!
//! ```text
//! files changed ──> WatchState (pending set)
//! build done ─────> snapshot ──> ChangeClassifier ──> NotificationChannel
//! ```
//!
//! Synchronous and single-threaded: the owning actor feeds it pipeline
//! events one at a time.

use std::path::PathBuf;
use std::sync::Arc;

use super::channel::{BroadcastReport, NotificationChannel};
use super::classify::{ChangeClassifier, Classification, UnitBuild};
use super::state::{WatchPhase, WatchState};

/// Outcome of handling one build completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub result: Classification,
    pub report: BroadcastReport,
}

pub struct ReloadCoordinator {
    classifier: ChangeClassifier,
    state: WatchState,
    channel: Arc<NotificationChannel>,
}

impl ReloadCoordinator {
    pub fn new(classifier: ChangeClassifier, channel: Arc<NotificationChannel>) -> Self {
        Self {
            classifier,
            state: WatchState::new(),
            channel,
        }
    }

    pub fn phase(&self) -> WatchPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    pub fn classifier_mut(&mut self) -> &mut ChangeClassifier {
        &mut self.classifier
    }

    /// The pipeline reported changed source files.
    pub fn files_changed(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.state.files_changed(paths);
    }

    /// The pipeline finished a build with these unit results.
    ///
    /// Reload results are broadcast before the pending set is cleared.
    pub fn build_completed(&mut self, units: Vec<UnitBuild>) -> BuildOutcome {
        let event = self.state.snapshot(units);
        let result = self.classifier.classify(&event);

        let report = if result.is_noop() {
            BroadcastReport::default()
        } else {
            self.channel.broadcast(&result)
        };

        self.state.settle(!result.is_noop());
        BuildOutcome { result, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::channel::testing::RecordingSink;

    fn setup() -> (ReloadCoordinator, RecordingSink) {
        let channel = Arc::new(NotificationChannel::new());
        let sink = RecordingSink::default();
        channel.accept(Box::new(sink.clone()), None);

        let classifier = ChangeClassifier::new([PathBuf::from("/ext/manifest.json")])
            .with_reload_relevant(["contentA".to_string()]);
        (ReloadCoordinator::new(classifier, channel), sink)
    }

    fn content_a(hash: &str) -> Vec<UnitBuild> {
        vec![UnitBuild::new(
            "contentA",
            hash,
            vec![PathBuf::from("/ext/contentA/index.ts")],
        )]
    }

    #[test]
    fn test_unit_reload_broadcasts_and_clears() {
        let (mut coordinator, sink) = setup();
        coordinator.build_completed(content_a("h1"));

        coordinator.files_changed([PathBuf::from("/ext/contentA/index.ts")]);
        assert_eq!(coordinator.phase(), WatchPhase::PendingClassification);

        let outcome = coordinator.build_completed(content_a("h2"));
        assert_eq!(
            outcome.result,
            Classification::UnitReload("contentA".to_string())
        );
        assert_eq!(outcome.report.delivered, 1);
        assert_eq!(
            sink.0.lock().as_slice(),
            [r#"{"eventName":"reload","data":"contentScripts"}"#]
        );
        assert_eq!(coordinator.phase(), WatchPhase::Idle);
        assert!(coordinator.state().pending().is_empty());
    }

    #[test]
    fn test_manifest_change_restarts() {
        let (mut coordinator, sink) = setup();
        coordinator.files_changed([PathBuf::from("/ext/manifest.json")]);

        let outcome = coordinator.build_completed(vec![]);
        assert_eq!(
            outcome.result,
            Classification::FullRestart(PathBuf::from("/ext/manifest.json"))
        );
        assert_eq!(
            sink.0.lock().as_slice(),
            [r#"{"eventName":"reload","data":"manifest"}"#]
        );
    }

    #[test]
    fn test_noop_keeps_pending_files() {
        let (mut coordinator, sink) = setup();
        coordinator.build_completed(content_a("h1"));

        coordinator.files_changed([PathBuf::from("/ext/contentA/index.ts")]);
        // build has not picked up the edit yet: same hash
        let outcome = coordinator.build_completed(content_a("h1"));
        assert!(outcome.result.is_noop());
        assert!(sink.0.lock().is_empty());
        assert_eq!(coordinator.phase(), WatchPhase::Idle);
        assert_eq!(coordinator.state().pending().len(), 1);

        // next build reflects it and the kept file still attributes the change
        let outcome = coordinator.build_completed(content_a("h2"));
        assert_eq!(
            outcome.result,
            Classification::UnitReload("contentA".to_string())
        );
    }

    #[test]
    fn test_no_clients_still_clears() {
        let channel = Arc::new(NotificationChannel::new());
        let classifier = ChangeClassifier::new([PathBuf::from("/ext/manifest.json")]);
        let mut coordinator = ReloadCoordinator::new(classifier, channel);

        coordinator.files_changed([PathBuf::from("/ext/manifest.json")]);
        let outcome = coordinator.build_completed(vec![]);
        assert_eq!(outcome.report, BroadcastReport::default());
        assert!(coordinator.state().pending().is_empty());
    }
}
