//! Log event model
//!
//! [`RawEvent`] is what a client sends, [`PendingEvent`] is a normalized
//! event waiting for an id, and [`LogEvent`] is the immutable record the
//! store hands out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Identifier used when a client does not report a device or session
pub const UNKNOWN_ID: &str = "unknown";

/// Identifier used when a client does not report a user
pub const ANONYMOUS_USER: &str = "anonymous";

/// Monotonic event identifier assigned by the store
pub type EventId = u64;

/// Event category. Names outside the known set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Ui,
    Navigation,
    Network,
    Data,
    Error,
    Auth,
    Performance,
    System,
    /// Category was not reported
    Unknown,
    /// Any other client-supplied name
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Ui => "UI",
            Category::Navigation => "Navigation",
            Category::Network => "Network",
            Category::Data => "Data",
            Category::Error => "Error",
            Category::Auth => "Auth",
            Category::Performance => "Performance",
            Category::System => "System",
            Category::Unknown => "Unknown",
            Category::Other(name) => name,
        }
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        match name {
            "UI" => Category::Ui,
            "Navigation" => Category::Navigation,
            "Network" => Category::Network,
            "Data" => Category::Data,
            "Error" => Category::Error,
            "Auth" => Category::Auth,
            "Performance" => Category::Performance,
            "System" => Category::System,
            "Unknown" => Category::Unknown,
            other => Category::Other(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        match Category::from(name.as_str()) {
            Category::Other(_) => Category::Other(name),
            known => known,
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl FromStr for Level {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            other => Err(StoreError::InvalidQuery(format!("unknown level '{}'", other))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event payload as reported by a client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Client-side identifier. Accepted for compatibility, never stored.
    #[serde(default)]
    pub id: Option<Value>,
    pub timestamp: Option<String>,
    pub category: Option<Category>,
    pub level: Option<Level>,
    pub event: String,
    pub details: Option<Map<String, Value>>,
    pub device_id: Option<String>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

/// Identifiers shared by every event of one ingest batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub device_id: String,
    pub session_id: String,
    pub user_id: String,
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            device_id: UNKNOWN_ID.to_string(),
            session_id: UNKNOWN_ID.to_string(),
            user_id: ANONYMOUS_USER.to_string(),
        }
    }
}

/// Normalized event that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    pub timestamp: String,
    pub received_at: DateTime<Utc>,
    pub category: Category,
    pub level: Level,
    pub event: String,
    pub details: Map<String, Value>,
    pub device_id: String,
    pub session_id: String,
    pub user_id: String,
}

impl PendingEvent {
    /// Fill in defaults for a raw payload received at `received_at`
    pub fn normalize(raw: RawEvent, origin: &Origin, received_at: DateTime<Utc>) -> Self {
        Self {
            timestamp: raw.timestamp.unwrap_or_else(|| received_at.to_rfc3339()),
            received_at,
            category: raw.category.unwrap_or(Category::Unknown),
            level: raw.level.unwrap_or_default(),
            event: raw.event,
            details: raw.details.unwrap_or_default(),
            device_id: raw.device_id.unwrap_or_else(|| origin.device_id.clone()),
            session_id: raw.session_id.unwrap_or_else(|| origin.session_id.clone()),
            user_id: raw.user_id.unwrap_or_else(|| origin.user_id.clone()),
        }
    }

    /// Minimal event for the given category and label, stamped now
    pub fn new(category: Category, event: impl Into<String>) -> Self {
        let origin = Origin::default();
        let received_at = Utc::now();
        Self {
            timestamp: received_at.to_rfc3339(),
            received_at,
            category,
            level: Level::Info,
            event: event.into(),
            details: Map::new(),
            device_id: origin.device_id,
            session_id: origin.session_id,
            user_id: origin.user_id,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// A stored log event. Immutable once admitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub id: EventId,
    pub timestamp: String,
    pub received_at: DateTime<Utc>,
    pub category: Category,
    pub level: Level,
    pub event: String,
    pub details: Map<String, Value>,
    pub device_id: String,
    pub session_id: String,
    pub user_id: String,
}

impl LogEvent {
    pub(crate) fn admit(id: EventId, pending: PendingEvent) -> Self {
        Self {
            id,
            timestamp: pending.timestamp,
            received_at: pending.received_at,
            category: pending.category,
            level: pending.level,
            event: pending.event,
            details: pending.details,
            device_id: pending.device_id,
            session_id: pending.session_id,
            user_id: pending.user_id,
        }
    }

    /// Detail value rendered as text, for scalar values only
    pub fn detail_text(&self, key: &str) -> Option<String> {
        match self.details.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
