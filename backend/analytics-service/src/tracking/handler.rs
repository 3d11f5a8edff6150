use std::sync::Arc;

use actix_web::http::header;
use actix_web::{post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::db::EventStore;
use crate::error::{AnalyticsError, Result};
use crate::metrics;
use crate::security::TokenVerifier;
use crate::tracking::types::{hash_ip, EventRow, IngestRequest, MAX_BATCH_EVENTS};
use crate::tracking::Enricher;

/// Shared state for the tracking endpoint.
pub struct TrackingState {
    pub store: Arc<dyn EventStore>,
    pub enricher: Option<Arc<dyn Enricher>>,
    pub verifier: Option<TokenVerifier>,
}

/// POST /api/track
///
/// No authentication required; `user_id` is extracted from the Bearer token
/// when one is present and valid. Returns 204 as soon as the batch is
/// validated; persistence and enrichment happen on a detached task whose
/// lifetime is independent of the client connection.
#[post("/api/track")]
pub async fn ingest(
    req: HttpRequest,
    body: web::Json<IngestRequest>,
    state: web::Data<TrackingState>,
) -> Result<HttpResponse> {
    let payloads = body.into_inner().events;
    if payloads.is_empty() || payloads.len() > MAX_BATCH_EVENTS {
        metrics::record_ingest_batch("rejected");
        return Err(AnalyticsError::BatchSize {
            got: payloads.len(),
            max: MAX_BATCH_EVENTS,
        });
    }

    let user_id = optional_user_id(&req, state.verifier.as_ref());
    let ip_hash = hash_ip(&client_ip(&req));
    let user_agent = header_str(&req, header::USER_AGENT);
    let now = Utc::now();

    let mut rows = Vec::with_capacity(payloads.len());
    for payload in payloads {
        // Malformed device ids are dropped silently; the rest of the batch
        // is unaffected.
        let Ok(device_id) = Uuid::parse_str(&payload.device_id) else {
            metrics::record_event_dropped();
            continue;
        };
        rows.push(EventRow {
            device_id,
            user_id,
            event: payload.event,
            properties: Value::Object(payload.properties),
            referrer: payload.referrer,
            ip_hash: ip_hash.clone(),
            user_agent: user_agent.clone(),
            created_at: now,
        });
    }

    metrics::record_ingest_batch("accepted");
    metrics::record_events_ingested(rows.len());

    // Detached from the request: cancelling the connection after the 204
    // must not abort the insert or the enrichment.
    let store = state.store.clone();
    let enricher = state.enricher.clone();
    tokio::spawn(async move {
        if let Err(e) = store.insert(&rows).await {
            warn!(error = %e, dropped = rows.len(), "event insert failed, batch lost");
        }
        // Enrichment is independent of persistence; a lost batch can still
        // contribute to the real-time rankings.
        if let Some(enricher) = enricher {
            enricher.process_events(&rows).await;
        }
    });

    Ok(HttpResponse::NoContent().finish())
}

/// Extract `user_id` from the Bearer token if present and valid.
/// Invalid or absent tokens make the batch anonymous, never an error.
fn optional_user_id(req: &HttpRequest, verifier: Option<&TokenVerifier>) -> Option<Uuid> {
    let verifier = verifier?;
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    verifier.parse_access_token(raw)
}

/// Resolve the client IP, preferring proxy headers over the socket address.
fn client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded) = req.headers().get("X-Forwarded-For") {
        if let Ok(value) = forwarded.to_str() {
            let first = value.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                // Some proxies append the port
                if let Ok(addr) = first.parse::<std::net::SocketAddr>() {
                    return addr.ip().to_string();
                }
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = req.headers().get("X-Real-IP") {
        if let Ok(value) = real_ip.to_str() {
            if !value.is_empty() {
                return value.trim().to_string();
            }
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}

fn header_str(req: &HttpRequest, name: header::HeaderName) -> String {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn client_ip_prefers_first_forwarded_entry() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 70.41.3.18"))
            .insert_header(("X-Real-IP", "198.51.100.1"))
            .to_http_request();
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn client_ip_strips_forwarded_port() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7:44321"))
            .to_http_request();
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip() {
        let req = TestRequest::default()
            .insert_header(("X-Real-IP", "198.51.100.1"))
            .to_http_request();
        assert_eq!(client_ip(&req), "198.51.100.1");
    }

    #[test]
    fn optional_user_id_is_none_without_verifier() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_http_request();
        assert_eq!(optional_user_id(&req, None), None);
    }
}
