//! Registry of currently-reachable radios and stations.
//!
//! [`DiscoveryRegistry`] aggregates live advertisements from the
//! independently-enabled discovery sources into one queryable set of
//! [`DiscoveredTarget`]s, keyed by identifier. It holds its own state and
//! nothing else: it never initiates connections.
//!
//! Reads take cloned snapshots under a read lock, so listener feeds can
//! keep writing while the orchestrator or a picker iterates a consistent
//! copy.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use sdrlink_core::{ClientRole, DiscoveredTarget, TargetSource};

/// A push-based advertisement event from a discovery feed.
#[derive(Debug, Clone)]
pub enum Advertisement {
    /// A target appeared or changed.
    Upsert(DiscoveredTarget),
    /// A target went away.
    Remove {
        /// Registry key of the departed target.
        id: String,
    },
}

struct RegistryInner {
    targets: HashMap<String, DiscoveredTarget>,
    disabled: HashSet<TargetSource>,
}

/// Aggregated view of every reachable radio and station.
pub struct DiscoveryRegistry {
    inner: RwLock<RegistryInner>,
}

impl Default for DiscoveryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryRegistry {
    /// Create an empty registry with all sources enabled.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                targets: HashMap::new(),
                disabled: HashSet::new(),
            }),
        }
    }

    /// Enable or disable a discovery source.
    ///
    /// Disabling immediately purges every target from that source and
    /// causes future advertisements from it to be ignored. Enabling has
    /// no immediate effect beyond allowing future advertisements back in.
    /// Idempotent in both directions.
    pub fn set_source_enabled(&self, source: TargetSource, enabled: bool) {
        let mut inner = self.inner.write().unwrap();
        if enabled {
            inner.disabled.remove(&source);
        } else {
            inner.disabled.insert(source);
            let before = inner.targets.len();
            inner.targets.retain(|_, t| t.source != source);
            let purged = before - inner.targets.len();
            if purged > 0 {
                tracing::debug!(source = %source, purged, "Purged targets for disabled source");
            }
        }
    }

    /// Whether a source is currently enabled.
    pub fn source_enabled(&self, source: TargetSource) -> bool {
        !self.inner.read().unwrap().disabled.contains(&source)
    }

    /// Insert or replace a target by identifier, last writer wins.
    ///
    /// Advertisements from a disabled source are ignored.
    pub fn upsert(&self, target: DiscoveredTarget) {
        let mut inner = self.inner.write().unwrap();
        if inner.disabled.contains(&target.source) {
            tracing::trace!(id = %target.id, source = %target.source, "Ignoring advertisement from disabled source");
            return;
        }
        inner.targets.insert(target.id.clone(), target);
    }

    /// Remove a target by identifier. Removing a non-existent identifier
    /// is a no-op.
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.write().unwrap();
        inner.targets.remove(id);
    }

    /// Remove every target matching the predicate.
    pub fn remove_where<F>(&self, predicate: F)
    where
        F: Fn(&DiscoveredTarget) -> bool,
    {
        let mut inner = self.inner.write().unwrap();
        inner.targets.retain(|_, t| !predicate(t));
    }

    /// Apply one advertisement event from a feed.
    pub fn apply(&self, advertisement: Advertisement) {
        match advertisement {
            Advertisement::Upsert(target) => self.upsert(target),
            Advertisement::Remove { id } => self.remove(&id),
        }
    }

    /// Look up a target by identifier.
    pub fn get(&self, id: &str) -> Option<DiscoveredTarget> {
        self.inner.read().unwrap().targets.get(id).cloned()
    }

    /// Whether a previously-saved default is still present and valid for
    /// the requested role.
    ///
    /// Full-control defaults must name a radio entry; shared defaults
    /// must name a station entry. Used to bypass interactive selection.
    pub fn resolve_default(&self, preferred: &str, role: ClientRole) -> Option<DiscoveredTarget> {
        if preferred.is_empty() {
            return None;
        }
        let target = self.get(preferred)?;
        let valid = match role {
            ClientRole::Gui => !target.is_station(),
            ClientRole::NonGui => target.is_station(),
        };
        valid.then_some(target)
    }

    /// Snapshot of all targets, sorted by identifier.
    pub fn targets(&self) -> Vec<DiscoveredTarget> {
        let inner = self.inner.read().unwrap();
        let mut targets: Vec<DiscoveredTarget> = inner.targets.values().cloned().collect();
        targets.sort_by(|a, b| a.id.cmp(&b.id));
        targets
    }

    /// Number of targets currently known.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().targets.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
