use std::collections::BTreeMap;

use crate::id::AssetId;
use crate::queue::AssetEvent;

/// Where a requested asset stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Ready,
    /// Load failed; dependent objects stay absent. Carries the error text.
    Unavailable(String),
}

/// Bookkeeping of every asset requested by a host.
#[derive(Debug, Default)]
pub struct AssetTracker {
    status: BTreeMap<AssetId, AssetStatus>,
}

impl AssetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an asset as requested. Re-requesting a ready asset resets it to
    /// pending.
    pub fn begin(&mut self, id: AssetId) {
        self.status.insert(id, AssetStatus::Pending);
    }

    /// Record a completion. Returns `false` for events nobody asked for.
    pub fn observe(&mut self, event: &AssetEvent) -> bool {
        let Some(slot) = self.status.get_mut(&event.id()) else {
            return false;
        };
        *slot = match event {
            AssetEvent::Loaded { .. } => AssetStatus::Ready,
            AssetEvent::Failed { error, .. } => AssetStatus::Unavailable(error.to_string()),
        };
        true
    }

    pub fn status(&self, id: AssetId) -> Option<&AssetStatus> {
        self.status.get(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.status
            .values()
            .filter(|s| **s == AssetStatus::Pending)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &AssetStatus)> {
        self.status.iter()
    }
}
