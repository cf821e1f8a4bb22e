//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! FsActor / stdin --Pipeline--> ReloadActor --broadcast--> NotificationChannel
//! acceptor ------AddClient----> WsActor ------accept-----> NotificationChannel
//! ```

use std::net::{SocketAddr, TcpStream};

use crate::pipeline::PipelineEvent;

// =============================================================================
// ReloadActor Messages
// =============================================================================

/// Messages to Reload Actor
#[derive(Debug)]
pub enum ReloadMsg {
    /// Event reported by the build pipeline
    Pipeline(PipelineEvent),
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Accepted TCP stream awaiting handshake
    AddClient(TcpStream, SocketAddr),
    /// Close every connection and stop
    Shutdown,
}
