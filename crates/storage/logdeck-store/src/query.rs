//! Filtering and cursor-based retrieval over a [`Snapshot`]
//!
//! Two page shapes are produced:
//!
//! - **Initial load** (no `after`): the newest `limit` matches, newest first.
//! - **Incremental poll** (`after = X`): the oldest `limit` matches with
//!   `id > X`, oldest first, so the caller can advance its cursor to the
//!   largest id it received.
//!
//! The cursor does not detect gaps. If more events are appended between
//! two polls than the store retains, the evicted ones are never delivered
//! to that consumer. [`Summary::oldest_id`](crate::Summary) lets a client
//! notice the condition (`after + 1 < oldest_id`); nothing here repairs it.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::event::{Category, EventId, Level, LogEvent};
use crate::store::Snapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query string parameters as received over the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    pub category: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
    pub after: Option<String>,
    pub limit: Option<String>,
}

/// Parsed filter and paging options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub category: Option<Category>,
    pub level: Option<Level>,
    /// Lowercased search needle
    pub search: Option<String>,
    pub after: Option<EventId>,
    pub limit: Option<usize>,
}

/// Empty values and `all` mean "no filter", as the dashboard sends them
fn filter_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "all")
}

impl TryFrom<QueryParams> for LogQuery {
    type Error = StoreError;

    fn try_from(params: QueryParams) -> Result<Self> {
        let level = filter_value(params.level)
            .map(|l| l.parse::<Level>())
            .transpose()?;

        let after = filter_value(params.after)
            .map(|a| {
                a.parse::<EventId>().map_err(|_| {
                    StoreError::InvalidQuery(format!("after must be an integer id, got '{}'", a))
                })
            })
            .transpose()?;

        let limit = filter_value(params.limit)
            .map(|l| {
                l.parse::<usize>().map_err(|_| {
                    StoreError::InvalidQuery(format!(
                        "limit must be a positive integer, got '{}'",
                        l
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            category: filter_value(params.category).map(Category::from),
            level,
            search: params
                .search
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty()),
            after,
            limit,
        })
    }
}

impl LogQuery {
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn search(mut self, needle: &str) -> Self {
        self.search = Some(needle.to_lowercase()).filter(|s| !s.is_empty());
        self
    }

    pub fn after(mut self, after: EventId) -> Self {
        self.after = Some(after);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an event passes the category, level and search filters
    pub fn matches(&self, event: &LogEvent) -> bool {
        if let Some(category) = &self.category {
            if &event.category != category {
                return false;
            }
        }
        if let Some(level) = self.level {
            if event.level != level {
                return false;
            }
        }
        match &self.search {
            Some(needle) => serde_json::to_string(event)
                .map(|text| text.to_lowercase().contains(needle.as_str()))
                .unwrap_or(false),
            None => true,
        }
    }
}

/// One page of query results
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryPage {
    pub events: Vec<Arc<LogEvent>>,
    /// Matches before the page cap was applied
    pub filtered: usize,
    pub has_more: bool,
}

impl QueryPage {
    pub fn ids(&self) -> Vec<EventId> {
        self.events.iter().map(|e| e.id).collect()
    }

    /// Cursor a poller should send next
    pub fn max_id(&self) -> Option<EventId> {
        self.events.iter().map(|e| e.id).max()
    }
}

/// Applies [`LogQuery`] values to snapshots
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine {
    default_limit: usize,
    max_limit: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

impl QueryEngine {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            default_limit: config.default_limit.max(1),
            max_limit: config.max_limit.max(1),
        }
    }

    /// Page size after defaults and clamping
    pub fn effective_limit(&self, query: &LogQuery) -> usize {
        query
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }

    pub fn run(&self, snapshot: &Snapshot, query: &LogQuery) -> QueryPage {
        let limit = self.effective_limit(query);
        let candidates = match query.after {
            Some(after) => snapshot.after(after),
            None => snapshot.events(),
        };

        let matches: Vec<&Arc<LogEvent>> = candidates
            .iter()
            .filter(|event| query.matches(event))
            .collect();
        let filtered = matches.len();

        let events: Vec<Arc<LogEvent>> = if query.after.is_some() {
            matches.into_iter().take(limit).cloned().collect()
        } else {
            matches.into_iter().rev().take(limit).cloned().collect()
        };

        QueryPage {
            has_more: filtered > events.len(),
            events,
            filtered,
        }
    }
}
