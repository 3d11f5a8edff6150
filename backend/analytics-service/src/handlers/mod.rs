pub mod analytics;

pub use analytics::{similar, suggestions, trending, AnalyticsHandlerState};
