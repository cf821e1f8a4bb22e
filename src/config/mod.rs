//! Reload configuration for `crx-reload.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── agent      # [agent]
//! │   ├── build      # [build]
//! │   ├── entry      # [entry] and manifest_path
//! │   └── inject     # [inject]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError
//! │   └── handle     # Global config handle
//! └── mod.rs         # ReloadConfig (this file)
//! ```
//!
//! # Example
//!
//! ```toml
//! host = "localhost"
//! port = 9980
//! manifest_path = "src/manifest.json"
//!
//! [entry]
//! background = "src/background/index.ts"
//! content_script_dir = "src/contentScripts"
//! ```
//!
//! Paths in the file are relative to the file's directory, paths given on
//! the command line are relative to the working directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{AgentConfig, BuildConfig, EntryConfig, InjectConfig, ManifestPath};
pub use types::{ConfigError, cfg, init_config};

use crate::{
    cli::{Cli, Commands, EntryArgs, NetArgs},
    debug, log,
    reload::server::WS_PATH,
    utils::path::resolve_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default server port.
pub const DEFAULT_PORT: u16 = 9980;

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing crx-reload.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Host the server binds and clients connect to
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (incremented when busy)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Files whose change forces a full restart
    #[serde(default, alias = "manifestPath")]
    pub manifest_path: ManifestPath,

    #[serde(default)]
    pub entry: EntryConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub inject: InjectConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            host: default_host(),
            port: DEFAULT_PORT,
            manifest_path: ManifestPath::default(),
            entry: EntryConfig::default(),
            build: BuildConfig::default(),
            inject: InjectConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl ReloadConfig {
    /// Load configuration from CLI arguments.
    ///
    /// The config file is optional: without one every setting comes from
    /// defaults and flags, and the project root is the working directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd.clone());
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd.clone(),
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        let root = config.root.clone();
        config.normalize_paths(&root);
        config.apply_command_options(cli, &cwd);
        config.validate(&cli.command)?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    fn normalize_paths(&mut self, root: &Path) {
        self.entry.normalize(root);
        self.manifest_path.normalize(root);
        self.build.normalize(root);
    }

    /// Apply command-specific flags on top of the file values.
    fn apply_command_options(&mut self, cli: &Cli, cwd: &Path) {
        match &cli.command {
            Commands::Serve {
                net,
                entry,
                stdin,
                stats,
                watch,
            } => {
                self.apply_net_args(net);
                self.apply_entry_args(entry, cwd);
                if let Some(stats) = stats {
                    self.build.stats = Some(resolve_path(stats, cwd));
                }
                // stdin carries change signals itself
                if *stdin && watch.is_none() && self.build.stats.is_none() {
                    self.build.watch = false;
                }
                if let Some(watch) = watch {
                    self.build.watch = *watch;
                }
            }
            Commands::Agent { net, settle_ms, .. } => {
                self.apply_net_args(net);
                if let Some(ms) = settle_ms {
                    self.agent.settle_ms = *ms;
                }
            }
            Commands::Entries { net, entry, .. } => {
                self.apply_net_args(net);
                self.apply_entry_args(entry, cwd);
            }
        }
    }

    fn apply_net_args(&mut self, net: &NetArgs) {
        Self::update_option(&mut self.host, net.host.as_ref());
        Self::update_option(&mut self.port, net.port.as_ref());
    }

    fn apply_entry_args(&mut self, args: &EntryArgs, cwd: &Path) {
        let resolve = |p: &Option<PathBuf>| p.as_ref().map(|p| resolve_path(p, cwd));

        if let Some(path) = resolve(&args.background) {
            self.entry.background = Some(path);
        }
        if let Some(path) = resolve(&args.popup) {
            self.entry.popup = Some(path);
        }
        if let Some(path) = resolve(&args.options) {
            self.entry.options = Some(path);
        }
        if let Some(path) = resolve(&args.content_script_dir) {
            self.entry.content_script_dir = Some(path);
        }
        if !args.manifest.is_empty() {
            let paths = args.manifest.iter().map(|p| resolve_path(p, cwd)).collect();
            self.manifest_path = ManifestPath::from_paths(paths);
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate the merged configuration for `command`.
    pub fn validate(&self, command: &Commands) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation("`host` must not be empty".into()));
        }
        if command.requires_entries() && self.entry.background.is_none() {
            return Err(ConfigError::MissingEntry("entry.background", "background"));
        }
        Ok(())
    }

    /// Files whose change forces a full restart.
    pub fn restart_triggers(&self) -> Vec<PathBuf> {
        self.manifest_path.paths()
    }

    /// URL agents connect to.
    pub fn server_url(&self) -> String {
        self.server_url_for(self.port)
    }

    /// URL for `port`, which may differ from the configured one after a
    /// bind retry.
    pub fn server_url_for(&self, port: u16) -> String {
        format!("ws://{}:{}{}", self.host, port, WS_PATH)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ReloadConfig {
    let (parsed, ignored) = ReloadConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("crx-reload").chain(args.iter().copied()))
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(ReloadConfig::parse_with_ignored("[entry\nbackground = \"bg.ts\"").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ReloadConfig::default();
        assert!(config.config_path.as_os_str().is_empty());
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9980);
        assert!(config.restart_triggers().is_empty());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_host_and_port() {
        let config = test_parse_config("host = \"0.0.0.0\"\nport = 9090");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.server_url(), "ws://0.0.0.0:9090/crxReloader");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "port = 9000\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ReloadConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.port, 9000);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_missing_background_rejected() {
        let config = test_parse_config("");
        let cli = parse_cli(&["serve"]);
        let err = config.validate(&cli.command).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEntry("entry.background", _)
        ));
    }

    #[test]
    fn test_agent_does_not_need_entries() {
        let config = test_parse_config("");
        let cli = parse_cli(&["agent", "--", "node", "host.js"]);
        assert!(config.validate(&cli.command).is_ok());
    }

    #[test]
    fn test_empty_host_rejected() {
        let config = test_parse_config("host = \" \"\n[entry]\nbackground = \"bg.ts\"");
        let cli = parse_cli(&["entries"]);
        assert!(matches!(
            config.validate(&cli.command),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = test_parse_config(
            "port = 9000\nmanifest_path = \"manifest.json\"\n[entry]\nbackground = \"bg.ts\"",
        );
        config.normalize_paths(Path::new("/ext"));

        let cli = parse_cli(&[
            "serve",
            "--port",
            "9100",
            "--popup",
            "popup.ts",
            "--manifest",
            "a.json",
            "--manifest",
            "b.json",
        ]);
        config.apply_command_options(&cli, Path::new("/work"));

        assert_eq!(config.port, 9100);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.entry.background, Some(PathBuf::from("/ext/bg.ts")));
        assert_eq!(config.entry.popup, Some(PathBuf::from("/work/popup.ts")));
        assert_eq!(
            config.restart_triggers(),
            vec![PathBuf::from("/work/a.json"), PathBuf::from("/work/b.json")]
        );
    }

    #[test]
    fn test_stdin_disables_watch_without_stats() {
        let mut config = test_parse_config("");
        let cli = parse_cli(&["serve", "--stdin"]);
        config.apply_command_options(&cli, Path::new("/work"));
        assert!(!config.build.watch);

        let mut config = test_parse_config("");
        let cli = parse_cli(&["serve", "--stdin", "--watch"]);
        config.apply_command_options(&cli, Path::new("/work"));
        assert!(config.build.watch);
    }

    #[test]
    fn test_agent_settle_override() {
        let mut config = test_parse_config("[agent]\nsettle_ms = 100");
        let cli = parse_cli(&["agent", "--settle-ms", "5"]);
        config.apply_command_options(&cli, Path::new("/work"));
        assert_eq!(config.agent.settle_ms, 5);
    }
}
