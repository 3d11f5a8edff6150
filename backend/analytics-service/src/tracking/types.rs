use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Maximum number of events accepted in one `POST /api/track` envelope.
pub const MAX_BATCH_EVENTS: usize = 50;

/// One event as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    pub device_id: String,
    pub event: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub referrer: String,
}

/// Envelope accepted by `POST /api/track`.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub events: Vec<EventPayload>,
}

/// Fully enriched event ready to be persisted.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub device_id: Uuid,
    pub user_id: Option<Uuid>,
    pub event: String,
    pub properties: Value,
    pub referrer: String,
    pub ip_hash: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// Hex SHA-256 of the client IP string. Raw addresses are never stored.
pub fn hash_ip(ip: &str) -> String {
    hex::encode(Sha256::digest(ip.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_ip_is_hex_sha256() {
        let hash = hash_ip("203.0.113.7");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // Same input, same digest
        assert_eq!(hash, hash_ip("203.0.113.7"));
        assert_ne!(hash, hash_ip("203.0.113.8"));
    }

    #[test]
    fn event_payload_defaults_optional_fields() {
        let payload: EventPayload = serde_json::from_str(
            r#"{"device_id": "d4a0cd67-0f9f-4f5c-ae4d-2f2b6eafd460", "event": "manga_view"}"#,
        )
        .unwrap();
        assert!(payload.properties.is_empty());
        assert_eq!(payload.referrer, "");
    }

    #[test]
    fn ingest_request_rejects_missing_events_field() {
        assert!(serde_json::from_str::<IngestRequest>(r#"{}"#).is_err());
    }
}
