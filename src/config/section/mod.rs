//! Configuration sections.
//!
//! | Section    | Purpose                                           |
//! |------------|---------------------------------------------------|
//! | `[entry]`  | Extension entry points (background, popup, ...)   |
//! | `[build]`  | Where build results come from                     |
//! | `[inject]` | Reload client scripts prepended in development    |
//! | `[agent]`  | Client agent timing                               |

mod agent;
mod build;
mod entry;
mod inject;

pub use agent::AgentConfig;
pub use build::BuildConfig;
pub use entry::{EntryConfig, ManifestPath};
pub use inject::InjectConfig;
