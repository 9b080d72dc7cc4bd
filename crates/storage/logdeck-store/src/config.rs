//! Store sizing and query limits

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// Default number of events retained before FIFO eviction starts
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Default page size for queries that do not pass `limit`
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Hard cap on the page size a caller may request
pub const DEFAULT_MAX_QUERY_LIMIT: usize = 1_000;

/// Configuration for a [`LogStore`](crate::LogStore) and its query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of events held at once
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Page size used when a query does not specify one
    #[serde(default = "default_query_limit")]
    pub default_limit: usize,

    /// Upper bound applied to any requested page size
    #[serde(default = "default_max_query_limit")]
    pub max_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_limit: DEFAULT_QUERY_LIMIT,
            max_limit: DEFAULT_MAX_QUERY_LIMIT,
        }
    }
}

impl StoreConfig {
    /// Config with the given capacity and default query limits
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Check that the values describe a usable store
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(StoreError::Config("capacity must be at least 1".to_string()));
        }
        if self.max_limit == 0 {
            return Err(StoreError::Config("max_limit must be at least 1".to_string()));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(StoreError::Config(format!(
                "default_limit must be between 1 and max_limit ({})",
                self.max_limit
            )));
        }
        Ok(())
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_query_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

fn default_max_query_limit() -> usize {
    DEFAULT_MAX_QUERY_LIMIT
}
