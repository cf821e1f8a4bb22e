//! FileSystem Actor
//!
//! Watches extension sources and the bundler's stats file, and turns
//! debounced changes into pipeline events for the ReloadActor.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (pure timing) → Router (targets) → ReloadMsg
//! ```

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::ReloadMsg;

// Pure timing and deduplication.
mod debouncer;
// Watch targets and event routing.
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


pub use router::WatchTargets;

use debouncer::Debouncer;
use router::events_to_messages;
use watch_roots::WatchRoots;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    targets: WatchTargets,
    reload_tx: mpsc::Sender<ReloadMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    /// Create a new FsActor. The watcher starts immediately, so changes
    /// made while the rest of the system starts are buffered.
    pub fn new(targets: WatchTargets, reload_tx: mpsc::Sender<ReloadMsg>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(targets.roots());
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            targets,
            reload_tx,
            debouncer: Debouncer::new(),
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            targets,
            reload_tx,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify is sync; bridge it into the runtime
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    if process_changes(&mut debouncer, &reload_tx, &targets).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Process debounced file changes
///
/// Returns `Err(())` if the ReloadActor shut down
async fn process_changes(
    debouncer: &mut Debouncer,
    reload_tx: &mpsc::Sender<ReloadMsg>,
    targets: &WatchTargets,
) -> Result<(), ()> {
    let Some(changes) = debouncer.take_if_ready() else {
        return Ok(());
    };

    for msg in events_to_messages(changes, targets) {
        reload_tx.send(msg).await.map_err(|_| ())?;
    }

    Ok(())
}
