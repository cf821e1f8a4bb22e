//! `[agent]` section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default settle delay before a context reloads itself.
pub const DEFAULT_SETTLE_MS: u64 = 800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Delay between a forwarded reload and the context reloading
    pub settle_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

impl AgentConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
