//! Reload Module
//!
//! Change classification and fan-out for extension live reload.
//!
//! ```text
//! pipeline --> ReloadCoordinator --> ChangeClassifier (HashTracker)
//!                     |
//!                     +--> NotificationChannel --> agents
//! ```
//!
//! # Modules
//!
//! - `tracker` - Last-seen content hash per unit
//! - `classify` - Build event classification (pure)
//! - `state` - Pending change set and watch phase
//! - `coordinator` - Glue: state + classifier + channel
//! - `channel` - Connection registry and broadcast
//! - `message` - Wire message (`{eventName, data}`)
//! - `server` - WebSocket listener

pub mod channel;
pub mod classify;
pub mod coordinator;
pub mod message;
pub mod server;
pub mod state;
pub mod tracker;

pub use channel::NotificationChannel;
pub use classify::{ChangeClassifier, UnitBuild};
pub use coordinator::ReloadCoordinator;
pub use message::{ReloadKind, ReloadMessage};
