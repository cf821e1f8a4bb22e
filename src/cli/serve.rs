//! `serve`: run the reload server next to a bundler in watch mode.

use anyhow::{Context, Result};

use crate::{actor::Coordinator, config::cfg, core::register_shutdown, entry, log};

/// Run the actor system until Ctrl+C (or until stdin input ends).
pub fn serve(read_stdin: bool) -> Result<()> {
    let config = cfg();
    if config.config_path.is_file() {
        log!("serve"; "config: {}", config.config_path.display());
    }
    if let Some(dir) = &config.entry.content_script_dir {
        let names = entry::content_script_names(dir);
        if names.is_empty() {
            log!("serve"; "no content scripts in {}", dir.display());
        } else {
            log!("serve"; "content scripts: {}", names.join(", "));
        }
    }
    if config.restart_triggers().is_empty() {
        log!("serve"; "no manifest_path set, full restarts are never triggered");
    }
    if !read_stdin && !config.build.watch {
        log!("serve"; "neither --stdin nor watching is enabled, no builds will be seen");
    }

    let shutdown_rx = register_shutdown();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(
        Coordinator::with_config(config)
            .with_stdin(read_stdin)
            .with_shutdown_signal(shutdown_rx)
            .run(),
    )
}
