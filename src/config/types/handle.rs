//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from actor threads.

use crate::config::ReloadConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<ReloadConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ReloadConfig::default()));

#[inline]
pub fn cfg() -> Arc<ReloadConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: ReloadConfig) -> Arc<ReloadConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
