//! Reload Actor - Classification and Notification
//!
//! Owns the [`ReloadCoordinator`] and feeds it pipeline events in arrival
//! order, so per-unit hash tracking never sees concurrent updates.
//!
//! ```text
//! FsActor / stdin --[Pipeline]--> ReloadActor --> NotificationChannel
//! ```

use std::path::PathBuf;

use tokio::sync::mpsc;

use super::messages::ReloadMsg;
use crate::entry::content_script_names;
use crate::logger::{status_success, status_unchanged};
use crate::pipeline::{BuildReport, PipelineEvent};
use crate::reload::ReloadCoordinator;
use crate::reload::coordinator::BuildOutcome;

/// Reload Actor - turns build completions into notifications
pub struct ReloadActor {
    rx: mpsc::Receiver<ReloadMsg>,
    coordinator: ReloadCoordinator,
    /// Rescanned on every build so added scripts become reload-relevant
    content_dir: Option<PathBuf>,
}

impl ReloadActor {
    pub fn new(
        rx: mpsc::Receiver<ReloadMsg>,
        coordinator: ReloadCoordinator,
        content_dir: Option<PathBuf>,
    ) -> Self {
        let mut actor = Self {
            rx,
            coordinator,
            content_dir,
        };
        actor.refresh_content_scripts();
        actor
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                ReloadMsg::Pipeline(event) => self.handle(event),
                ReloadMsg::Shutdown => {
                    crate::debug!("reload"; "shutting down");
                    break;
                }
            }
        }
    }

    fn handle(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::FilesChanged(paths) => {
                let count = paths.len();
                self.coordinator.files_changed(paths);
                crate::debug!("watch"; "{} file(s) changed, {:?}", count, self.coordinator.phase());
            }
            PipelineEvent::BuildCompleted(report) => {
                let outcome = self.build_completed(report);
                Self::report(&outcome);
            }
        }
    }

    fn build_completed(&mut self, report: BuildReport) -> BuildOutcome {
        self.coordinator.files_changed(report.changed_files);
        self.refresh_content_scripts();
        crate::debug!(
            "reload";
            "build completed, {} unit(s), {} pending file(s)",
            report.units.len(),
            self.coordinator.state().pending().len()
        );
        self.coordinator.build_completed(report.units)
    }

    fn refresh_content_scripts(&mut self) {
        if let Some(dir) = &self.content_dir {
            let names = content_script_names(dir);
            crate::debug!("reload"; "content scripts: {:?}", names);
            self.coordinator.classifier_mut().set_reload_relevant(names);
        }
    }

    fn report(outcome: &BuildOutcome) {
        if outcome.result.is_noop() {
            status_unchanged("build finished, nothing to reload");
            return;
        }
        let mut message = outcome.result.describe();
        if outcome.report.delivered == 0 {
            message.push_str(" (no clients)");
        }
        status_success(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::channel::testing::RecordingSink;
    use crate::reload::{ChangeClassifier, NotificationChannel, UnitBuild};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn done(units: Vec<UnitBuild>, changed: Vec<PathBuf>) -> ReloadMsg {
        ReloadMsg::Pipeline(PipelineEvent::BuildCompleted(BuildReport {
            changed_files: changed,
            units,
        }))
    }

    #[tokio::test]
    async fn test_discovered_script_reloads() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("inject.ts");
        fs::write(&script, "").unwrap();

        let channel = Arc::new(NotificationChannel::new());
        let sink = RecordingSink::default();
        channel.accept(Box::new(sink.clone()), None);

        let coordinator =
            ReloadCoordinator::new(ChangeClassifier::new(Vec::new()), Arc::clone(&channel));
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(
            ReloadActor::new(rx, coordinator, Some(dir.path().to_path_buf())).run(),
        );

        let unit = |hash: &str| vec![UnitBuild::new("inject", hash, vec![script.clone()])];
        tx.send(done(unit("h1"), vec![])).await.unwrap();
        tx.send(ReloadMsg::Pipeline(PipelineEvent::FilesChanged(vec![
            script.clone(),
        ])))
        .await
        .unwrap();
        tx.send(done(unit("h2"), vec![])).await.unwrap();
        tx.send(ReloadMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            sink.0.lock().as_slice(),
            [r#"{"eventName":"reload","data":"contentScripts"}"#]
        );
    }

    #[tokio::test]
    async fn test_completion_changed_files_are_used() {
        let channel = Arc::new(NotificationChannel::new());
        let sink = RecordingSink::default();
        channel.accept(Box::new(sink.clone()), None);

        let manifest = PathBuf::from("/ext/manifest.json");
        let coordinator = ReloadCoordinator::new(
            ChangeClassifier::new([manifest.clone()]),
            Arc::clone(&channel),
        );
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(ReloadActor::new(rx, coordinator, None).run());

        tx.send(done(vec![], vec![manifest])).await.unwrap();
        tx.send(ReloadMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            sink.0.lock().as_slice(),
            [r#"{"eventName":"reload","data":"manifest"}"#]
        );
    }
}
