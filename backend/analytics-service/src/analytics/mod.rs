//! Real-time analytics on the scored-set backend.
//!
//! Trending is a global sorted set with hourly multiplicative decay;
//! interest profiles are per-device hashes with per-write decay. Both are
//! updated by the enricher after events are persisted and read back by the
//! query endpoints.

pub mod points;
pub mod scripts;
pub mod store;

pub use store::AnalyticsStore;
