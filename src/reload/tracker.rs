//! Per-unit content hash tracking.
//!
//! Remembers the last hash seen for every unit so a build can tell whether a
//! unit actually changed. State lives only in memory: a fresh process starts
//! with no baselines.

use rustc_hash::FxHashMap;

/// Last observed hash for each unit id.
#[derive(Debug, Default)]
pub struct HashTracker {
    units: FxHashMap<String, String>,
}

impl HashTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hash` for `unit_id`, returning whether it changed.
    ///
    /// The first observation of a unit only establishes its baseline and
    /// returns `false`, so startup builds never produce reloads. Afterwards
    /// the result is `true` exactly when `hash` differs from the stored one.
    /// The stored hash is always replaced.
    pub fn observe(&mut self, unit_id: &str, hash: &str) -> bool {
        match self.units.get_mut(unit_id) {
            Some(last) if last == hash => false,
            Some(last) => {
                crate::debug!("reload"; "unit {} hash {} -> {}", unit_id, last, hash);
                *last = hash.to_string();
                true
            }
            None => {
                self.units.insert(unit_id.to_string(), hash.to_string());
                false
            }
        }
    }

    /// Last recorded hash for a unit.
    #[cfg(test)]
    pub fn last_hash(&self, unit_id: &str) -> Option<&str> {
        self.units.get(unit_id).map(String::as_str)
    }

    /// Number of units seen so far.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.units.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_is_baseline() {
        let mut tracker = HashTracker::new();
        assert!(!tracker.observe("contentA", "h1"));
        assert_eq!(tracker.last_hash("contentA"), Some("h1"));
    }

    #[test]
    fn test_changed_hash_reported_once() {
        let mut tracker = HashTracker::new();
        tracker.observe("contentA", "h1");

        assert!(tracker.observe("contentA", "h2"));
        assert!(!tracker.observe("contentA", "h2"));
        assert!(!tracker.observe("contentA", "h2"));
        assert_eq!(tracker.last_hash("contentA"), Some("h2"));
    }

    #[test]
    fn test_revert_counts_as_change() {
        let mut tracker = HashTracker::new();
        tracker.observe("contentA", "h1");
        assert!(tracker.observe("contentA", "h2"));
        assert!(tracker.observe("contentA", "h1"));
    }

    #[test]
    fn test_units_are_independent() {
        let mut tracker = HashTracker::new();
        tracker.observe("contentA", "h1");
        tracker.observe("contentB", "h1");

        assert!(tracker.observe("contentA", "h2"));
        assert!(!tracker.observe("contentB", "h1"));
        assert_eq!(tracker.len(), 2);
    }
}
