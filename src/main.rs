//! crx-reload - live reload for browser extension development.

mod actor;
mod agent;
mod cli;
mod config;
mod core;
mod entry;
mod freshness;
mod logger;
mod pipeline;
mod reload;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, agent::AgentPlan};
use config::{ReloadConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = match ReloadConfig::load(cli) {
        Ok(config) => init_config(config),
        Err(e) => {
            log!("error"; "{:#}", e);
            std::process::exit(1);
        }
    };

    match &cli.command {
        Commands::Serve { stdin, .. } => cli::serve::serve(*stdin),
        Commands::Agent {
            host_cmd,
            contexts,
            siblings,
            ..
        } => cli::agent::run_agent(
            &config,
            AgentPlan {
                host: host_cmd,
                contexts,
                siblings,
            },
        ),
        Commands::Entries {
            production, base, ..
        } => cli::entries::print_entries(&config, *production, base.as_deref()),
    }
}
