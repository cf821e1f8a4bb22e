use tokio::sync::mpsc;

use super::{ReloadSignal, Reloadable};
use crate::reload::{ReloadKind, ReloadMessage};

/// Handle to a context agent.
#[derive(Debug, Clone)]
pub struct ContextLink {
    pub name: String,
    pub tx: mpsc::UnboundedSender<ReloadSignal>,
    /// Managed contexts also reload on content script changes
    pub managed: bool,
}

impl ContextLink {
    fn signal(&self) -> bool {
        let sent = self.tx.send(ReloadSignal).is_ok();
        if !sent {
            crate::debug!("agent"; "context {} is gone", self.name);
        }
        sent
    }
}

/// Host-side agent.
///
/// - `manifest`: every tracked context is signaled, then the host restarts.
/// - `contentScripts`: only managed contexts are signaled.
pub struct HostAgent {
    host: Option<Box<dyn Reloadable>>,
    contexts: Vec<ContextLink>,
}

impl HostAgent {
    pub fn new(host: Option<Box<dyn Reloadable>>, contexts: Vec<ContextLink>) -> Self {
        Self { host, contexts }
    }

    /// Apply a notification. Returns how many contexts were signaled.
    pub fn on_notification(&mut self, kind: ReloadKind) -> usize {
        crate::log!("agent"; "reload {}", kind);
        match kind {
            ReloadKind::Manifest => {
                let signaled = self.contexts.iter().filter(|c| c.signal()).count();
                if let Some(host) = &mut self.host {
                    match host.reload() {
                        Ok(()) => crate::log!("agent"; "restarted {}", host.name()),
                        Err(e) => crate::log!("error"; "failed to restart {}: {:#}", host.name(), e),
                    }
                }
                signaled
            }
            ReloadKind::ContentScripts => self
                .contexts
                .iter()
                .filter(|c| c.managed)
                .filter(|c| c.signal())
                .count(),
        }
    }

    /// Apply a raw text frame. Malformed frames are ignored.
    pub fn on_text(&mut self, text: &str) -> usize {
        match ReloadMessage::from_json(text) {
            Some(msg) => self.on_notification(msg.data),
            None => {
                crate::debug!("agent"; "ignoring malformed message: {}", text);
                0
            }
        }
    }
}
