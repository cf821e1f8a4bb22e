use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::host::ContextLink;
use super::{ReloadSignal, Reloadable};

/// Context-side agent: on a forwarded signal, wait `settle`, then reload.
///
/// Signals arriving during the settle delay are folded into the same
/// reload.
pub struct ContextAgent<R> {
    rx: mpsc::UnboundedReceiver<ReloadSignal>,
    settle: Duration,
    target: R,
}

impl<R: Reloadable> ContextAgent<R> {
    pub fn new(rx: mpsc::UnboundedReceiver<ReloadSignal>, settle: Duration, target: R) -> Self {
        Self { rx, settle, target }
    }

    /// Run until the host side drops its link.
    pub async fn run(mut self) {
        while self.rx.recv().await.is_some() {
            tokio::time::sleep(self.settle).await;
            while self.rx.try_recv().is_ok() {}

            match self.target.reload() {
                Ok(()) => crate::log!("agent"; "reloaded {}", self.target.name()),
                Err(e) => crate::log!("error"; "failed to reload {}: {:#}", self.target.name(), e),
            }
        }
        crate::debug!("agent"; "context {} stopped", self.target.name());
    }
}

/// Start a context agent task for `target` and return its link.
pub fn spawn_context<R>(target: R, settle: Duration, managed: bool) -> (ContextLink, JoinHandle<()>)
where
    R: Reloadable + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let link = ContextLink {
        name: target.name().to_string(),
        tx,
        managed,
    };
    let handle = tokio::spawn(ContextAgent::new(rx, settle, target).run());
    (link, handle)
}
