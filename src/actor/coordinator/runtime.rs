use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::{ReloadMsg, WsMsg};
use crate::actor::reload::ReloadActor;
use crate::actor::ws::WsActor;

/// Run all actors concurrently.
///
/// Stops on the shutdown signal, or when the reload actor ends on its own
/// (pipeline input closed).
pub(super) async fn run_actors(
    fs: Option<FsActor>,
    reload: ReloadActor,
    ws: WsActor,
    reload_tx: mpsc::Sender<ReloadMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let reload_handle = tokio::spawn(async move { reload.run().await });
    let ws_handle = tokio::spawn(async move { ws.run().await });
    let fs_handle = fs.map(|fs| tokio::spawn(async move { fs.run().await }));

    loop {
        if shutdown_rx.as_ref().is_some_and(|rx| rx.try_recv().is_ok()) {
            crate::debug!("actor"; "shutdown signal received");
            break;
        }
        if reload_handle.is_finished() {
            crate::log!("serve"; "pipeline closed");
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let _ = reload_tx.send(ReloadMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;
    if let Some(handle) = fs_handle {
        handle.abort();
    }

    let _ = tokio::time::timeout(Duration::from_millis(500), reload_handle).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;

    Ok(())
}
