//! WebSocket Actor - Connection Intake
//!
//! This actor is responsible for:
//! - Completing the WebSocket handshake for accepted streams
//! - Registering clients with the [`NotificationChannel`]
//! - Detecting closed clients from a background reader thread
//!
//! Broadcasting is not routed through this actor: the reload actor writes
//! to the channel directly, so intake never delays a notification.
//!
//! # Architecture
//!
//! ```text
//! acceptor --[AddClient]--> WsActor --accept--> NotificationChannel
//!                                                   ^
//!                         reader thread --poll------+
//! ```

mod client_io;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use super::messages::WsMsg;
use crate::reload::NotificationChannel;

/// How often the reader thread polls client sockets.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// WebSocket Actor - manages client connections
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    /// Registry shared with the reload actor
    channel: Arc<NotificationChannel>,
}

impl WsActor {
    /// Create a new WsActor
    pub fn new(rx: mpsc::Receiver<WsMsg>, channel: Arc<NotificationChannel>) -> Self {
        Self { rx, channel }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let channel = Arc::clone(&self.channel);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || Self::client_reader_loop(channel, stop))
        };

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::AddClient(stream, peer) => {
                    if let Some(sink) = client_io::handshake(stream, peer) {
                        self.channel.accept(Box::new(sink), Some(peer));
                    }
                }
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    break;
                }
            }
        }

        stop.store(true, Ordering::Relaxed);
        let _ = reader.join();
        self.channel.close_all();
    }

    /// Background thread detecting closed clients (non-blocking poll)
    fn client_reader_loop(channel: Arc<NotificationChannel>, stop: Arc<AtomicBool>) {
        while !stop.load(Ordering::Relaxed) {
            std::thread::sleep(POLL_INTERVAL);
            let dropped = channel.poll_connections();
            if dropped > 0 {
                crate::debug!("ws"; "{} client(s) went away", dropped);
            }
        }
    }
}
