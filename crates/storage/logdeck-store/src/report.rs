//! Summary counters over a whole snapshot
//!
//! Everything here is a full scan, recomputed on every request. With the
//! store bounded that stays cheap; with a large capacity and a high poll
//! rate the counters should move into the store and be updated on
//! append and eviction instead.

use crate::event::{EventId, Level};
use crate::store::Snapshot;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate view of the retained events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub error_count: usize,
    pub categories: BTreeMap<String, usize>,
    /// Smallest id still retained
    pub oldest_id: Option<EventId>,
    /// Last id ever assigned by the store
    pub latest_id: EventId,
}

impl Summary {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut categories = BTreeMap::new();
        let mut error_count = 0;

        for event in snapshot.events() {
            *categories.entry(event.category.to_string()).or_insert(0) += 1;
            if event.level == Level::Error {
                error_count += 1;
            }
        }

        Self {
            total: snapshot.len(),
            error_count,
            categories,
            oldest_id: snapshot.oldest_id(),
            latest_id: snapshot.last_id(),
        }
    }

    /// Whether a consumer whose cursor is `after` has missed evicted events
    pub fn has_gap_after(&self, after: EventId) -> bool {
        self.oldest_id.map_or(false, |oldest| after.saturating_add(1) < oldest)
    }
}
