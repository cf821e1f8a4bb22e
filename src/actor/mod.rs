//! Actor System for Live Reload
//!
//! Message-passing concurrency for `serve`:
//!
//! ```text
//! FsActor ─┐
//!          ├─[Pipeline]─> ReloadActor ──broadcast──> NotificationChannel
//! stdin ───┘                                              ^
//! acceptor ──[AddClient]──> WsActor ───────accept─────────┘
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `reload` - Classification and notification
//! - `ws` - WebSocket handshake and connection liveness
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod reload;
pub mod ws;

pub use coordinator::Coordinator;
