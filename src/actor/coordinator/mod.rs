//! Actor Coordinator - Wires up the Reload Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Binds the WebSocket listener
//! - Creates communication channels
//! - Wires up actors and pipeline sources
//! - Runs them concurrently

mod runtime;
mod stdin;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, WatchTargets};
use super::messages::{ReloadMsg, WsMsg};
use super::reload::ReloadActor;
use super::ws::WsActor;
use crate::config::ReloadConfig;
use crate::reload::server::start_ws_server_with_channel;
use crate::reload::{ChangeClassifier, NotificationChannel, ReloadCoordinator};

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<ReloadConfig>,
    read_stdin: bool,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Create from Arc<ReloadConfig>.
    pub fn with_config(config: Arc<ReloadConfig>) -> Self {
        Self {
            config,
            read_stdin: false,
            shutdown_rx: None,
        }
    }

    /// Read pipeline events from stdin.
    pub fn with_stdin(mut self, enabled: bool) -> Self {
        self.read_stdin = enabled;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system until shutdown.
    pub async fn run(mut self) -> Result<()> {
        let config = Arc::clone(&self.config);
        let (reload_tx, reload_rx) = mpsc::channel::<ReloadMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let addr = start_ws_server_with_channel(&config.host, config.port, ws_tx.clone())
            .context("websocket server failed")?;
        crate::log!("serve"; "running at {}", config.server_url_for(addr.port()));

        let channel = Arc::new(NotificationChannel::new());
        let classifier = ChangeClassifier::new(config.restart_triggers());
        let coordinator = ReloadCoordinator::new(classifier, Arc::clone(&channel));
        let reload_actor = ReloadActor::new(
            reload_rx,
            coordinator,
            config.entry.content_script_dir.clone(),
        );
        let ws_actor = WsActor::new(ws_rx, channel);

        let fs_actor = if config.build.watch {
            let targets = WatchTargets::from_config(&config);
            let actor = FsActor::new(targets, reload_tx.clone())
                .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
            Some(actor)
        } else {
            None
        };

        if self.read_stdin {
            stdin::spawn_reader(config.root.clone(), reload_tx.clone());
        }

        crate::debug!("actor"; "start");
        runtime::run_actors(
            fs_actor,
            reload_actor,
            ws_actor,
            reload_tx,
            ws_tx,
            self.shutdown_rx.take(),
        )
        .await?;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
