//! Event scoring contracts.
//!
//! The exact values are part of the analytics contract with the reader
//! clients; changing them changes every stored score's meaning.

/// Base points an event contributes to the device's interest profile.
/// Tag dimensions split the points evenly; author and category receive the
/// full amount.
pub fn interest_points(event: &str) -> Option<f64> {
    match event {
        "manga_view" => Some(1.0),
        "chapter_open" => Some(3.0),
        "chapter_complete" => Some(5.0),
        "comment_post" => Some(4.0),
        "bookmark_add" => Some(8.0),
        "bookmark_remove" => Some(-3.0),
        _ => None,
    }
}

/// Score increment an event contributes to the global trending set.
pub fn trending_points(event: &str) -> Option<f64> {
    match event {
        "manga_view" => Some(1.0),
        "chapter_open" => Some(3.0),
        "chapter_complete" => Some(5.0),
        _ => None,
    }
}

/// Multiplier applied to an existing interest score before adding new
/// points: `new = old * INTEREST_DECAY + points`. At 0.98 an untouched
/// dimension fades to ~1% of its value after ~230 other interactions.
pub const INTEREST_DECAY: f64 = 0.98;

/// Applied to the entire trending set once per hour. At 0.9 a score decays
/// to ~1% after ~44 idle hours.
pub const TRENDING_DECAY: f64 = 0.9;
