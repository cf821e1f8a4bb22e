use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::actor::messages::ReloadMsg;
use crate::pipeline::ndjson::read_events;

/// Forward NDJSON pipeline events from stdin to the reload actor.
///
/// End of input shuts the reload actor down, which ends the serve loop.
pub(super) fn spawn_reader(root: PathBuf, reload_tx: mpsc::Sender<ReloadMsg>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        read_events(stdin.lock(), &root, |event| {
            !crate::core::is_shutdown() && reload_tx.blocking_send(ReloadMsg::Pipeline(event)).is_ok()
        });
        crate::debug!("serve"; "stdin closed");
        let _ = reload_tx.blocking_send(ReloadMsg::Shutdown);
    });
}
