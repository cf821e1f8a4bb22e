//! Client Agent
//!
//! Runs next to the processes that make up a running extension and reloads
//! them when the server says so.
//!
//! ```text
//! server --{eventName, data}--> client::spawn_listener
//!                                    │ ReloadKind
//!                                    v
//!                               HostAgent ──ReloadSignal──> ContextAgent (settle, reload)
//!                                    │
//!                                    └── manifest: restart host
//! ```
//!
//! A context only ever sees a bare [`ReloadSignal`]; which kind of change
//! caused it is decided by the host.

pub mod client;
mod context;
mod host;
mod process;

pub use context::spawn_context;
pub use host::HostAgent;
pub use process::ChildProcess;

use anyhow::Result;

/// Forwarded instruction to reload. Carries no classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignal;

/// Something that can be reloaded in place.
pub trait Reloadable: Send {
    fn name(&self) -> &str;

    /// Reload (or restart) now.
    fn reload(&mut self) -> Result<()>;
}
