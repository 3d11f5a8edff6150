//! Prometheus metrics for ingestion and the decay job.

use std::time::Duration;

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

static INGEST_BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tracking_ingest_batches_total",
        "Track batches by outcome (accepted/rejected)",
        &["status"]
    )
    .expect("Failed to register ingest batches metric")
});

static INGEST_EVENTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tracking_ingest_events_total",
        "Events accepted for persistence"
    )
    .expect("Failed to register ingest events metric")
});

static EVENTS_DROPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tracking_events_dropped_total",
        "Events dropped for malformed device ids"
    )
    .expect("Failed to register dropped events metric")
});

static DECAY_TICKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "trending_decay_ticks_total",
        "Trending decay passes by outcome (success/error)",
        &["status"]
    )
    .expect("Failed to register decay ticks metric")
});

static DECAY_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "trending_decay_duration_seconds",
        "Duration of trending decay passes",
        &["status"],
        vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0]
    )
    .expect("Failed to register decay duration metric")
});

pub fn record_ingest_batch(status: &str) {
    INGEST_BATCHES_TOTAL.with_label_values(&[status]).inc();
}

pub fn record_events_ingested(count: usize) {
    INGEST_EVENTS_TOTAL.inc_by(count as u64);
}

pub fn record_event_dropped() {
    EVENTS_DROPPED_TOTAL.inc();
}

pub fn record_decay_tick(status: &str, duration: Duration) {
    DECAY_TICKS_TOTAL.with_label_values(&[status]).inc();
    DECAY_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(duration.as_secs_f64());
}

/// GET /metrics
pub async fn serve_metrics() -> HttpResponse {
    let mut buffer = String::new();
    let encoder = TextEncoder::new();
    if encoder
        .encode_utf8(&prometheus::gather(), &mut buffer)
        .is_err()
    {
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}
