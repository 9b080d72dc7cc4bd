//! Batch ingestion
//!
//! A batch is decoded and normalized in full before the store is touched.
//! One bad payload rejects the whole batch, so a client either gets all of
//! its events admitted or a clear error and an unchanged store.

use crate::error::{Result, StoreError};
use crate::event::{EventId, Origin, PendingEvent, RawEvent, ANONYMOUS_USER, UNKNOWN_ID};
use crate::store::LogStore;
use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Request envelope sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestBatch {
    pub device_id: Option<String>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    /// Payloads are kept undecoded so a failure can name its position.
    /// Required: a body without it is rejected rather than read as empty.
    pub logs: Vec<Value>,
}

impl IngestBatch {
    fn origin(&self) -> Origin {
        Origin {
            device_id: self.device_id.clone().unwrap_or_else(|| UNKNOWN_ID.to_string()),
            session_id: self.session_id.clone().unwrap_or_else(|| UNKNOWN_ID.to_string()),
            user_id: self.user_id.clone().unwrap_or_else(|| ANONYMOUS_USER.to_string()),
        }
    }
}

/// Outcome of an accepted batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    /// Events admitted from this batch
    pub received: usize,
    /// Store size after admission
    pub total: usize,
    pub first_id: Option<EventId>,
    pub last_id: Option<EventId>,
}

/// Validates batches and admits them to a shared store
#[derive(Debug, Clone)]
pub struct IngestionService {
    store: Arc<LogStore>,
}

impl IngestionService {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<LogStore> {
        &self.store
    }

    /// Decode, normalize and admit a batch
    pub fn ingest(&self, batch: IngestBatch) -> Result<IngestReceipt> {
        let origin = batch.origin();
        let pending = match normalize_batch(batch.logs, &origin) {
            Ok(pending) => pending,
            Err(e) => {
                counter!("logdeck_batches_rejected_total").increment(1);
                warn!(device_id = %origin.device_id, error = %e, "Rejected log batch");
                return Err(e);
            }
        };

        let received = pending.len();
        let appended = self.store.append_batch(pending);
        let total = appended.len;

        counter!("logdeck_events_ingested_total").increment(received as u64);
        info!(device_id = %origin.device_id, received, total, "Received logs");

        Ok(IngestReceipt {
            received,
            total,
            first_id: appended.ids.as_ref().map(|ids| *ids.start()),
            last_id: appended.ids.as_ref().map(|ids| *ids.end()),
        })
    }
}

/// Turn raw payloads into pending events, failing on the first bad one
pub fn normalize_batch(payloads: Vec<Value>, origin: &Origin) -> Result<Vec<PendingEvent>> {
    let received_at = Utc::now();
    payloads
        .into_iter()
        .enumerate()
        .map(|(index, payload)| {
            let raw: RawEvent = serde_json::from_value(payload).map_err(|e| {
                StoreError::MalformedPayload {
                    index,
                    reason: e.to_string(),
                }
            })?;
            Ok(PendingEvent::normalize(raw, origin, received_at))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Category, Level};
    use serde_json::json;

    fn service(capacity: usize) -> IngestionService {
        IngestionService::new(Arc::new(LogStore::new(capacity).unwrap()))
    }

    fn batch(logs: Vec<Value>) -> IngestBatch {
        IngestBatch {
            device_id: Some("iphone-15".to_string()),
            logs,
            ..IngestBatch::default()
        }
    }

    #[test]
    fn test_ingest_admits_in_order() {
        let service = service(100);
        let receipt = service
            .ingest(batch(vec![
                json!({ "event": "App launched", "category": "System" }),
                json!({ "event": "Request failed", "category": "Network", "level": "error" }),
            ]))
            .unwrap();

        assert_eq!(receipt.received, 2);
        assert_eq!(receipt.total, 2);
        assert_eq!(receipt.first_id, Some(1));
        assert_eq!(receipt.last_id, Some(2));

        let snapshot = service.store().snapshot();
        let events = snapshot.events();
        assert_eq!(events[0].event, "App launched");
        assert_eq!(events[0].category, Category::System);
        assert_eq!(events[1].level, Level::Error);
        assert!(events.iter().all(|e| e.device_id == "iphone-15"));
    }

    #[test]
    fn test_malformed_payload_rejects_whole_batch() {
        let service = service(100);
        service.ingest(batch(vec![json!({ "event": "seed" })])).unwrap();

        let err = service
            .ingest(batch(vec![
                json!({ "event": "fine" }),
                json!({ "category": "UI" }),
            ]))
            .unwrap_err();

        assert!(matches!(err, StoreError::MalformedPayload { index: 1, .. }));
        assert_eq!(service.store().len(), 1);
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let service = service(10);
        let err = service.ingest(batch(vec![json!("just a string")])).unwrap_err();
        assert!(err.is_client_error());
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_empty_batch_is_accepted() {
        let service = service(10);
        let receipt = service.ingest(batch(Vec::new())).unwrap();
        assert_eq!(receipt.received, 0);
        assert_eq!(receipt.first_id, None);
    }

    #[test]
    fn test_envelope_requires_logs_field() {
        assert!(serde_json::from_value::<IngestBatch>(json!({})).is_err());
        assert!(serde_json::from_value::<IngestBatch>(json!({
            "deviceId": "iphone",
            "log": [{ "event": "typo key" }]
        }))
        .is_err());

        let batch: IngestBatch = serde_json::from_value(json!({ "logs": [] })).unwrap();
        assert!(batch.logs.is_empty());
    }

    #[test]
    fn test_total_reflects_eviction() {
        let service = service(3);
        let logs = (0..5).map(|i| json!({ "event": format!("e{}", i) })).collect();
        let receipt = service.ingest(batch(logs)).unwrap();
        assert_eq!(receipt.received, 5);
        assert_eq!(receipt.total, 3);
        assert_eq!(receipt.last_id, Some(5));
    }
}
