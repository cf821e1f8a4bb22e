//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Live reload for browser extension development
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: crx-reload.toml)
    #[arg(short = 'C', long, global = true, default_value = "crx-reload.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the reload server for a bundler in watch mode
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        net: NetArgs,

        #[command(flatten)]
        entry: EntryArgs,

        /// Read pipeline events as JSON lines from stdin
        #[arg(long)]
        stdin: bool,

        /// Stats file the bundler rewrites after every build
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        stats: Option<PathBuf>,

        /// Watch entry sources and the stats file
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Connect to a running server and restart processes on reload
    #[command(visible_alias = "a")]
    Agent {
        #[command(flatten)]
        net: NetArgs,

        /// Context command reloaded on every notification (repeatable)
        #[arg(long = "context", value_name = "CMD")]
        contexts: Vec<String>,

        /// Context command reloaded only on a full restart (repeatable)
        #[arg(long = "sibling", value_name = "CMD")]
        siblings: Vec<String>,

        /// Delay before a context reloads, in milliseconds
        #[arg(long, value_name = "MS")]
        settle_ms: Option<u64>,

        /// Host command restarted on a full restart
        #[arg(id = "host_cmd", last = true, value_name = "HOST_CMD")]
        host_cmd: Vec<String>,
    },

    /// Print the bundler entry map as JSON
    #[command(visible_alias = "e")]
    Entries {
        #[command(flatten)]
        net: NetArgs,

        #[command(flatten)]
        entry: EntryArgs,

        /// Omit the reload clients (production build)
        #[arg(long)]
        production: bool,

        /// JSON file with the bundler's existing entries to merge onto
        #[arg(long, value_name = "FILE")]
        base: Option<PathBuf>,
    },
}

impl Commands {
    /// Whether this command needs `entry.background`.
    pub fn requires_entries(&self) -> bool {
        !matches!(self, Self::Agent { .. })
    }
}

/// Server address overrides.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct NetArgs {
    /// Host the server binds / the agent connects to
    #[arg(long)]
    pub host: Option<String>,

    /// Port number
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Entry overrides.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct EntryArgs {
    /// Background script entry
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub background: Option<PathBuf>,

    /// Popup page entry
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub popup: Option<PathBuf>,

    /// Options page entry
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub options: Option<PathBuf>,

    /// Directory holding one content script per file or folder
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub content_script_dir: Option<PathBuf>,

    /// Files whose change forces a full restart (repeatable)
    #[arg(long = "manifest", value_hint = clap::ValueHint::FilePath)]
    pub manifest: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from([
            "crx-reload",
            "serve",
            "--background",
            "src/background.ts",
            "--manifest",
            "a.json",
            "--manifest",
            "b.json",
            "--stdin",
        ]);
        let Commands::Serve { entry, stdin, .. } = cli.command else {
            panic!("expected serve");
        };
        assert!(stdin);
        assert_eq!(entry.background, Some(PathBuf::from("src/background.ts")));
        assert_eq!(entry.manifest.len(), 2);
    }

    #[test]
    fn test_parse_agent_host_command() {
        let cli = Cli::parse_from([
            "crx-reload",
            "agent",
            "--context",
            "node tab.js",
            "--",
            "node",
            "host.js",
        ]);
        let Commands::Agent {
            host_cmd, contexts, ..
        } = &cli.command
        else {
            panic!("expected agent");
        };
        assert_eq!(host_cmd, &["node", "host.js"]);
        assert_eq!(contexts, &["node tab.js"]);
        assert!(!cli.command.requires_entries());
    }

    #[test]
    fn test_agent_host_flag_and_command_coexist() {
        let cli = Cli::parse_from([
            "crx-reload",
            "agent",
            "--host",
            "127.0.0.1",
            "--port",
            "9981",
            "--",
            "node",
            "host.js",
        ]);
        let Commands::Agent { net, host_cmd, .. } = &cli.command else {
            panic!("expected agent");
        };
        assert_eq!(net.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(net.port, Some(9981));
        assert_eq!(host_cmd, &["node", "host.js"]);
    }

    #[test]
    fn test_parse_entries_base() {
        let cli = Cli::parse_from([
            "crx-reload",
            "entries",
            "--production",
            "--base",
            "webpack.entries.json",
        ]);
        let Commands::Entries {
            production, base, ..
        } = &cli.command
        else {
            panic!("expected entries");
        };
        assert!(*production);
        assert_eq!(base.as_deref(), Some(Path::new("webpack.entries.json")));
    }
}
