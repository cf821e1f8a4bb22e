//! Reload Message Protocol
//!
//! JSON message sent over WebSocket from the server to every agent:
//!
//! ```json
//! { "eventName": "reload", "data": "contentScripts" }
//! { "eventName": "reload", "data": "manifest" }
//! ```
//!
//! Unit identity is not on the wire: a unit reload is reported as
//! `contentScripts`, a full restart as `manifest`.

use serde::{Deserialize, Serialize};

use super::classify::Classification;

/// The only event name clients understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventName {
    Reload,
}

/// Public reload category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReloadKind {
    /// A content script bundle changed
    #[serde(rename = "contentScripts")]
    ContentScripts,
    /// A restart-trigger file (the manifest) changed
    #[serde(rename = "manifest")]
    Manifest,
}

impl ReloadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContentScripts => "contentScripts",
            Self::Manifest => "manifest",
        }
    }
}

impl std::fmt::Display for ReloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadMessage {
    pub event_name: EventName,
    pub data: ReloadKind,
}

impl ReloadMessage {
    pub fn new(data: ReloadKind) -> Self {
        Self {
            event_name: EventName::Reload,
            data,
        }
    }

    /// Collapse a classification to its wire form (`None` for `NoOp`).
    pub fn from_classification(result: &Classification) -> Option<Self> {
        match result {
            Classification::NoOp => None,
            Classification::UnitReload(_) => Some(Self::new(ReloadKind::ContentScripts)),
            Classification::FullRestart(_) => Some(Self::new(ReloadKind::Manifest)),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"eventName":"reload","data":"{}"}}"#, self.data)
        })
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_unit_reload_payload() {
        let msg =
            ReloadMessage::from_classification(&Classification::UnitReload("contentA".into()))
                .unwrap();
        assert_eq!(
            msg.to_json(),
            r#"{"eventName":"reload","data":"contentScripts"}"#
        );
    }

    #[test]
    fn test_full_restart_payload() {
        let msg = ReloadMessage::from_classification(&Classification::FullRestart(
            PathBuf::from("manifest.json"),
        ))
        .unwrap();
        assert_eq!(msg.to_json(), r#"{"eventName":"reload","data":"manifest"}"#);
    }

    #[test]
    fn test_noop_has_no_payload() {
        assert!(ReloadMessage::from_classification(&Classification::NoOp).is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ReloadMessage::from_json("not json").is_none());
        assert!(ReloadMessage::from_json(r#"{"eventName":"reload","data":"popup"}"#).is_none());
        assert!(ReloadMessage::from_json(r#"{"eventName":"ping","data":"manifest"}"#).is_none());
    }

    #[test]
    fn test_parse_manifest() {
        let msg = ReloadMessage::from_json(r#"{"eventName":"reload","data":"manifest"}"#).unwrap();
        assert_eq!(msg.data, ReloadKind::Manifest);
    }
}
