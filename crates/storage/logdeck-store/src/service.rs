//! Facade tying the store, ingestion and query paths together

use crate::config::StoreConfig;
use crate::error::Result;
use crate::heuristics::{current_screen, current_user};
use crate::ingest::{IngestBatch, IngestReceipt, IngestionService};
use crate::query::{LogQuery, QueryEngine, QueryPage};
use crate::report::Summary;
use crate::store::{LogStore, StoreStats};
use std::sync::Arc;

/// Everything a dashboard poll needs, computed from one snapshot
#[derive(Debug, Clone)]
pub struct LogView {
    pub page: QueryPage,
    pub summary: Summary,
    pub current_screen: String,
    pub current_user: String,
}

/// Owned handle to a store plus the services that read and write it.
///
/// Cheap to clone; clones share the same store.
#[derive(Debug, Clone)]
pub struct LogService {
    store: Arc<LogStore>,
    ingestion: IngestionService,
    engine: QueryEngine,
}

impl LogService {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let store = Arc::new(LogStore::from_config(&config)?);
        Ok(Self {
            ingestion: IngestionService::new(store.clone()),
            engine: QueryEngine::new(&config),
            store,
        })
    }

    pub fn store(&self) -> &Arc<LogStore> {
        &self.store
    }

    pub fn ingest(&self, batch: IngestBatch) -> Result<IngestReceipt> {
        self.ingestion.ingest(batch)
    }

    /// Filtered page, aggregates and derived state over a single snapshot
    pub fn view(&self, query: &LogQuery) -> LogView {
        let snapshot = self.store.snapshot();
        LogView {
            page: self.engine.run(&snapshot, query),
            summary: Summary::from_snapshot(&snapshot),
            current_screen: current_screen(&snapshot),
            current_user: current_user(&snapshot),
        }
    }

    pub fn clear(&self) -> usize {
        self.store.clear()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }
}
