//! `entries`: print the bundler entry map.

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::{
    config::ReloadConfig,
    entry::{EntryMap, build_entries_onto},
    utils::path::resolve_path,
};

/// Print the entry map as JSON on stdout.
///
/// With `base`, the bundler's existing entries are read from that JSON file
/// and the generated entries are merged on top.
pub fn print_entries(config: &ReloadConfig, production: bool, base: Option<&Path>) -> Result<()> {
    let base = match base {
        Some(path) => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            load_base(&resolve_path(path, &cwd))?
        }
        None => EntryMap::new(),
    };
    let entries = build_entries_onto(base, config, !production, config.port);
    println!("{}", serde_json::to_string_pretty(&entries.to_json())?);
    Ok(())
}

fn load_base(path: &Path) -> Result<EntryMap> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    EntryMap::from_json(&value).with_context(|| format!("bad entries in {}", path.display()))
}
