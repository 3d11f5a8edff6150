//! Tracking ingestion: the write side of the analytics subsystem.
//!
//! `POST /api/track` accepts batches of client events, stamps server-side
//! fields, and hands the batch to the event store and the enricher on a
//! detached task. Nothing downstream of validation can fail the request.

pub mod handler;
pub mod types;

use async_trait::async_trait;

pub use handler::{ingest, TrackingState};
pub use types::{hash_ip, EventPayload, EventRow, IngestRequest, MAX_BATCH_EVENTS};

/// Hook called after events are persisted. Implementations update the
/// real-time analytics stores (trending, interest profiles). Errors are
/// absorbed internally; enrichment must never block or fail ingestion.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn process_events(&self, events: &[EventRow]);
}
