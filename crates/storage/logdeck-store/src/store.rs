//! Bounded, thread-safe event store
//!
//! The store keeps at most `capacity` events in id order and evicts the
//! oldest one whenever an append would exceed that bound. Ids come from a
//! counter that lives under the same lock as the buffer, so the order of
//! ids is the order in which writers acquired the lock. The counter
//! survives [`LogStore::clear`], which keeps cursors held by dashboards
//! from colliding with ids issued after a clear.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::event::{EventId, LogEvent, PendingEvent};
use metrics::{counter, gauge};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Counters describing the lifetime of a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Events currently held
    pub len: usize,
    /// Events ever admitted
    pub appended: u64,
    /// Events dropped by capacity pressure
    pub evicted: u64,
    /// Number of explicit clears
    pub clears: u64,
    /// Last id handed out, 0 before the first append
    pub last_id: EventId,
}

/// Point-in-time copy of the store contents, ordered by id ascending
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    events: Vec<Arc<LogEvent>>,
    last_id: EventId,
}

impl Snapshot {
    pub fn events(&self) -> &[Arc<LogEvent>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Smallest id still retained
    pub fn oldest_id(&self) -> Option<EventId> {
        self.events.first().map(|e| e.id)
    }

    /// Last id the store ever assigned, even if that event is gone
    pub fn last_id(&self) -> EventId {
        self.last_id
    }

    /// Iterate newest to oldest
    pub fn newest_first(&self) -> impl Iterator<Item = &Arc<LogEvent>> {
        self.events.iter().rev()
    }

    /// Events with `id > after`, using the id ordering of the snapshot
    pub fn after(&self, after: EventId) -> &[Arc<LogEvent>] {
        let start = self.events.partition_point(|e| e.id <= after);
        &self.events[start..]
    }
}

/// Outcome of [`LogStore::append_batch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAppend {
    /// Ids given to the batch, `None` for an empty batch
    pub ids: Option<RangeInclusive<EventId>>,
    /// Store size as the write lock was released
    pub len: usize,
}

#[derive(Debug)]
struct Inner {
    events: VecDeque<Arc<LogEvent>>,
    last_id: EventId,
    appended: u64,
    evicted: u64,
    clears: u64,
}

impl Inner {
    fn push(&mut self, pending: PendingEvent, capacity: usize) -> (EventId, bool) {
        self.last_id += 1;
        self.appended += 1;
        self.events.push_back(Arc::new(LogEvent::admit(self.last_id, pending)));

        let evicted = if self.events.len() > capacity {
            self.events.pop_front();
            self.evicted += 1;
            true
        } else {
            false
        };
        (self.last_id, evicted)
    }
}

/// Capacity-bounded FIFO store of log events
#[derive(Debug)]
pub struct LogStore {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl LogStore {
    /// Create a store holding at most `capacity` events
    pub fn new(capacity: usize) -> Result<Self> {
        StoreConfig::with_capacity(capacity).validate()?;
        Ok(Self::with_validated_capacity(capacity))
    }

    /// Create a store from a full configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_validated_capacity(config.capacity))
    }

    fn with_validated_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                events: VecDeque::with_capacity(capacity.min(StoreConfig::default().capacity)),
                last_id: 0,
                appended: 0,
                evicted: 0,
                clears: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admit one event and return its id
    pub fn append(&self, event: PendingEvent) -> EventId {
        let (id, evicted, len) = {
            let mut inner = self.inner.write();
            let (id, evicted) = inner.push(event, self.capacity);
            (id, evicted, inner.events.len())
        };

        counter!("logdeck_events_appended_total").increment(1);
        if evicted {
            counter!("logdeck_events_evicted_total").increment(1);
        }
        gauge!("logdeck_store_size").set(len as f64);
        id
    }

    /// Admit a batch under a single lock acquisition.
    ///
    /// The batch receives contiguous ids and no reader sees part of it.
    pub fn append_batch<I>(&self, events: I) -> BatchAppend
    where
        I: IntoIterator<Item = PendingEvent>,
    {
        let mut first = None;
        let mut last = None;
        let mut evicted = 0u64;
        let len = {
            let mut inner = self.inner.write();
            for event in events {
                let (id, was_evicted) = inner.push(event, self.capacity);
                first.get_or_insert(id);
                last = Some(id);
                evicted += u64::from(was_evicted);
            }
            inner.events.len()
        };

        let ids = first.zip(last).map(|(first, last)| first..=last);
        if let Some(ids) = &ids {
            counter!("logdeck_events_appended_total").increment(ids.end() - ids.start() + 1);
        }
        if evicted > 0 {
            counter!("logdeck_events_evicted_total").increment(evicted);
            tracing::debug!(evicted, capacity = self.capacity, "Evicted oldest events");
        }
        gauge!("logdeck_store_size").set(len as f64);
        BatchAppend { ids, len }
    }

    /// Consistent copy of every retained event, oldest first
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.read();
        Snapshot {
            events: inner.events.iter().cloned().collect(),
            last_id: inner.last_id,
        }
    }

    /// Drop every event. Ids keep increasing afterwards.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut inner = self.inner.write();
            let removed = inner.events.len();
            inner.events.clear();
            inner.clears += 1;
            removed
        };

        counter!("logdeck_store_clears_total").increment(1);
        gauge!("logdeck_store_size").set(0.0);
        tracing::info!(removed, "Cleared log store");
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        StoreStats {
            len: inner.events.len(),
            appended: inner.appended,
            evicted: inner.evicted,
            clears: inner.clears,
            last_id: inner.last_id,
        }
    }
}
