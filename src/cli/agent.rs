//! `agent`: connect to the server and restart local processes.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::task::JoinHandle;

use crate::{
    agent::{ChildProcess, HostAgent, Reloadable, client, spawn_context},
    config::ReloadConfig,
    core::register_shutdown,
    log,
};

/// What the agent supervises.
pub struct AgentPlan<'a> {
    pub host: &'a [String],
    pub contexts: &'a [String],
    pub siblings: &'a [String],
}

/// Run until Ctrl+C or until the server goes away.
pub fn run_agent(config: &ReloadConfig, plan: AgentPlan<'_>) -> Result<()> {
    if plan.host.is_empty() && plan.contexts.is_empty() && plan.siblings.is_empty() {
        bail!("nothing to supervise: pass a host command after `--` or --context/--sibling");
    }

    let url = config.server_url();
    let socket = client::connect(&url)?;
    log!("agent"; "connected to {}", url);

    let shutdown_rx = register_shutdown();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(async {
        let host: Option<Box<dyn Reloadable>> = if plan.host.is_empty() {
            None
        } else {
            let mut process = ChildProcess::from_slice(plan.host)?;
            process.spawn()?;
            Some(Box::new(process))
        };

        let settle = config.agent.settle();
        let mut links = Vec::new();
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();
        let managed = plan.contexts.iter().map(|c| (c, true));
        let unmanaged = plan.siblings.iter().map(|c| (c, false));
        for (line, is_managed) in managed.chain(unmanaged) {
            let mut process = ChildProcess::shell(line);
            process.spawn()?;
            let (link, task) = spawn_context(process, settle, is_managed);
            links.push(link);
            tasks.push(task);
        }

        let mut agent = HostAgent::new(host, links);
        let mut notifications = client::spawn_listener(socket);

        let result: Result<()> = loop {
            if shutdown_rx.try_recv().is_ok() {
                break Ok(());
            }
            match tokio::time::timeout(Duration::from_millis(100), notifications.recv()).await {
                Ok(Some(text)) => {
                    agent.on_text(&text);
                }
                Ok(None) => break Err(anyhow::anyhow!("connection to {} lost", url)),
                Err(_) => {}
            }
        };

        // dropping the links stops the context agents, which kills their processes
        drop(agent);
        for task in tasks {
            let _ = tokio::time::timeout(Duration::from_millis(500), task).await;
        }
        result
    })
}
