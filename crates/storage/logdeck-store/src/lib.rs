//! # LogDeck Store
//!
//! In-memory log aggregation core: a capacity-bounded, thread-safe event
//! buffer with monotonic ids, batch ingestion, and cursor-based queries
//! for polling dashboards.
//!
//! ## Key Features
//! - FIFO eviction at a fixed capacity
//! - Ids that keep increasing across clears
//! - Incremental retrieval with an `after` cursor
//! - Category, level and free-text filters
//! - Per-query aggregates and "current screen/user" inference

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod event;
pub mod heuristics;
pub mod ingest;
pub mod query;
pub mod report;
pub mod service;
pub mod store;

// Re-export main types
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use event::{Category, EventId, Level, LogEvent, PendingEvent, RawEvent};
pub use ingest::{IngestBatch, IngestReceipt, IngestionService};
pub use query::{LogQuery, QueryEngine, QueryPage, QueryParams};
pub use report::Summary;
pub use service::{LogService, LogView};
pub use store::{BatchAppend, LogStore, Snapshot, StoreStats};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Category, IngestBatch, Level, LogEvent, LogQuery, LogService, LogStore, PendingEvent,
        Result, StoreConfig, StoreError,
    };
}
