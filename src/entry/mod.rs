//! Bundler entry resolution.
//!
//! Produces the entry map handed to the bundler:
//!
//! ```json
//! {
//!   "background": { "import": ["<client>?ws://localhost:9980/crxReloader", "src/background.ts"] },
//!   "popup":      { "import": [] },
//!   "inject":     { "import": ["<content client>", "src/contentScripts/inject.ts"] }
//! }
//! ```
//!
//! Content script names double as the reload-relevant unit ids.

mod discover;

pub use discover::{content_script_names, discover_content_scripts};

use std::path::Path;

use anyhow::{Result, bail};
use serde_json::{Map, Value, json};

use crate::config::ReloadConfig;

/// Ordered `name -> imports` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMap {
    entries: Vec<(String, Vec<String>)>,
}

impl EntryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. A replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, imports: Vec<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = imports,
            None => self.entries.push((name, imports)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, imports)| imports.as_slice())
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Parse an existing bundler entry object.
    ///
    /// Each value may be a path, a list of paths, or `{ "import": .. }`.
    /// Other entry options are not carried over.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            bail!("entry map must be a JSON object");
        };
        let mut map = Self::new();
        for (name, entry) in object {
            let imports = match entry {
                Value::Object(fields) => fields.get("import").and_then(import_list),
                other => import_list(other),
            };
            let Some(imports) = imports else {
                bail!("entry `{name}` has no usable import");
            };
            map.insert(name.clone(), imports);
        }
        Ok(map)
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, imports)| (name.clone(), json!({ "import": imports })))
            .collect();
        Value::Object(map)
    }
}

fn import_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(path) => Some(vec![path.clone()]),
        Value::Array(items) => items.iter().map(|v| v.as_str().map(str::to_owned)).collect(),
        _ => None,
    }
}

/// Merge entry slices in order; later slices override earlier keys.
pub fn merge_entries<I>(slices: I) -> EntryMap
where
    I: IntoIterator<Item = EntryMap>,
{
    let mut merged = EntryMap::new();
    for slice in slices {
        for (name, imports) in slice.entries {
            merged.insert(name, imports);
        }
    }
    merged
}

/// Imports for a page entry: `[background client?, dev clients.., path]`.
fn normal_entry(name: &str, path: Option<&Path>, prelude: &[String]) -> EntryMap {
    let mut slice = EntryMap::new();
    let imports = match path {
        Some(path) => prelude
            .iter()
            .cloned()
            .chain(std::iter::once(path.display().to_string()))
            .collect(),
        None => Vec::new(),
    };
    slice.insert(name, imports);
    slice
}

/// Content script entries, each prefixed by the content client in dev.
fn content_entries(config: &ReloadConfig, dev: bool) -> EntryMap {
    let mut slice = EntryMap::new();
    let Some(dir) = &config.entry.content_script_dir else {
        return slice;
    };

    for script in discover_content_scripts(dir) {
        let mut imports = Vec::new();
        if dev && let Some(client) = &config.inject.content_client {
            imports.push(client.clone());
        }
        imports.push(script.path.display().to_string());
        slice.insert(script.name, imports);
    }
    slice
}

/// Build the full entry map for `config`.
///
/// With `dev` set, reload and dev-server clients are prepended; the
/// background client receives the server URL as its query string.
pub fn build_entries(config: &ReloadConfig, dev: bool) -> EntryMap {
    build_entries_onto(EntryMap::new(), config, dev, config.port)
}

/// Merge the generated entries over `base`, the bundler's own entries.
///
/// `base` keeps its order; generated names replace matching base names.
/// `port` is the port the server actually bound.
pub fn build_entries_onto(
    base: EntryMap,
    config: &ReloadConfig,
    dev: bool,
    port: u16,
) -> EntryMap {
    let dev_clients: Vec<String> = if dev {
        config.inject.dev_server_clients.clone()
    } else {
        Vec::new()
    };

    let mut background_prelude = Vec::new();
    if dev && let Some(client) = &config.inject.background_client {
        background_prelude.push(format!("{client}?{}", config.server_url_for(port)));
    }
    background_prelude.extend(dev_clients.iter().cloned());

    let background = normal_entry(
        "background",
        config.entry.background.as_deref(),
        &background_prelude,
    );
    let popup = normal_entry("popup", config.entry.popup.as_deref(), &dev_clients);
    let options = normal_entry("options", config.entry.options.as_deref(), &dev_clients);

    merge_entries([
        base,
        background,
        popup,
        options,
        content_entries(config, dev),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config_with(dir: Option<PathBuf>) -> ReloadConfig {
        let mut config = ReloadConfig::default();
        config.entry.background = Some(PathBuf::from("/ext/bg.ts"));
        config.entry.popup = Some(PathBuf::from("/ext/popup.ts"));
        config.entry.content_script_dir = dir;
        config.inject.background_client = Some("bg-client.js".into());
        config.inject.content_client = Some("cs-client.js".into());
        config.inject.dev_server_clients = vec!["dev-client.js".into()];
        config
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut map = EntryMap::new();
        map.insert("a", vec!["1".into()]);
        map.insert("b", vec![]);
        map.insert("a", vec!["2".into()]);

        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&["2".to_string()][..]));
    }

    #[test]
    fn test_merge_later_overrides() {
        let mut base = EntryMap::new();
        base.insert("main", vec![]);
        base.insert("background", vec!["old.ts".into()]);
        let mut over = EntryMap::new();
        over.insert("background", vec!["new.ts".into()]);
        over.insert("inject", vec!["inject.ts".into()]);

        let merged = merge_entries([base, over]);
        assert_eq!(
            merged.names().collect::<Vec<_>>(),
            vec!["main", "background", "inject"]
        );
        assert_eq!(merged.get("background"), Some(&["new.ts".to_string()][..]));
    }

    #[test]
    fn test_dev_entries_inject_clients() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("inject.ts"), "").unwrap();

        let config = config_with(Some(dir.path().to_path_buf()));
        let entries = build_entries(&config, true);

        assert_eq!(
            entries.get("background").unwrap(),
            [
                "bg-client.js?ws://localhost:9980/crxReloader",
                "dev-client.js",
                "/ext/bg.ts"
            ]
        );
        assert_eq!(
            entries.get("popup").unwrap(),
            ["dev-client.js", "/ext/popup.ts"]
        );
        assert!(entries.get("options").unwrap().is_empty());

        let inject = entries.get("inject").unwrap();
        assert_eq!(inject[0], "cs-client.js");
        assert!(inject[1].ends_with("inject.ts"));
    }

    #[test]
    fn test_production_entries_plain() {
        let config = config_with(None);
        let entries = build_entries(&config, false);

        assert_eq!(entries.get("background").unwrap(), ["/ext/bg.ts"]);
        assert_eq!(entries.get("popup").unwrap(), ["/ext/popup.ts"]);
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_bound_port_in_query() {
        let config = config_with(None);
        let entries = build_entries_onto(EntryMap::new(), &config, true, 9981);
        assert_eq!(
            entries.get("background").unwrap()[0],
            "bg-client.js?ws://localhost:9981/crxReloader"
        );
    }

    #[test]
    fn test_to_json_shape() {
        let mut map = EntryMap::new();
        map.insert("background", vec!["bg.ts".into()]);
        map.insert("popup", vec![]);

        assert_eq!(
            map.to_json().to_string(),
            r#"{"background":{"import":["bg.ts"]},"popup":{"import":[]}}"#
        );
    }

    #[test]
    fn test_base_entries_kept_and_overridden() {
        let base = EntryMap::from_json(&json!({
            "main": "src/main.ts",
            "background": { "import": ["old-bg.ts"] },
            "vendor": ["react", "react-dom"]
        }))
        .unwrap();

        let config = config_with(None);
        let entries = build_entries_onto(base, &config, false, 9980);

        assert_eq!(
            entries.names().collect::<Vec<_>>(),
            vec!["main", "background", "vendor", "popup", "options"]
        );
        assert_eq!(entries.get("main").unwrap(), ["src/main.ts"]);
        assert_eq!(entries.get("vendor").unwrap(), ["react", "react-dom"]);
        assert_eq!(entries.get("background").unwrap(), ["/ext/bg.ts"]);
    }

    #[test]
    fn test_from_json_rejects_bad_entries() {
        assert!(EntryMap::from_json(&json!(["main.ts"])).is_err());
        assert!(EntryMap::from_json(&json!({ "main": 1 })).is_err());
        assert!(EntryMap::from_json(&json!({ "main": { "dependOn": "x" } })).is_err());
        assert!(EntryMap::from_json(&json!({ "main": ["a.ts", 2] })).is_err());
    }
}
