//! `[inject]` section: reload clients prepended to entries in development.
//!
//! ```toml
//! [inject]
//! background_client = "node_modules/crx-reload-client/background.js"
//! content_client = "node_modules/crx-reload-client/content.js"
//! dev_server_clients = ["node_modules/webpack-dev-server/client/index.js"]
//! ```
//!
//! The background client receives the server URL as its query string.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    /// Client that connects to the reload server (background entry only)
    pub background_client: Option<String>,
    /// Client that reloads a content script when told to
    pub content_client: Option<String>,
    /// Dev server clients for background, popup and options
    pub dev_server_clients: Vec<String>,
}
