//! Analytics read endpoints: trending, per-device suggestions, and
//! per-manga similarity.

use std::sync::Arc;

use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::analytics::AnalyticsStore;
use crate::error::{AnalyticsError, Result};
use crate::models::{Manga, MangaResponse};
use crate::storage::CoverStorage;

const DEFAULT_TRENDING_LIMIT: i64 = 12;
const DEFAULT_SUGGESTIONS_LIMIT: i64 = 12;
const DEFAULT_SIMILAR_LIMIT: i64 = 8;
const MAX_LIMIT: i64 = 50;

pub struct AnalyticsHandlerState {
    pub store: Arc<AnalyticsStore>,
    pub covers: CoverStorage,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub device_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub manga_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
struct TrendingItem {
    #[serde(flatten)]
    manga: MangaResponse,
    trending_score: f64,
}

/// GET /api/v1/analytics/trending
///
/// Top mangas ranked by decaying activity score.
#[get("/trending")]
pub async fn trending(
    query: web::Query<TrendingQuery>,
    state: web::Data<AnalyticsHandlerState>,
) -> Result<HttpResponse> {
    let limit = parse_limit(query.limit, DEFAULT_TRENDING_LIMIT)?;

    let ranked = state.store.trending(limit).await?;

    let mut out = Vec::with_capacity(ranked.len());
    for (manga, score) in &ranked {
        let cover_url = resolve_cover(&state.covers, manga).await;
        out.push(TrendingItem {
            manga: MangaResponse::from_manga(manga, cover_url),
            trending_score: *score,
        });
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": out })))
}

/// GET /api/v1/analytics/suggestions
///
/// Personalised suggestions for a device. A device without an interest
/// profile gets an empty list.
#[get("/suggestions")]
pub async fn suggestions(
    query: web::Query<SuggestionsQuery>,
    state: web::Data<AnalyticsHandlerState>,
) -> Result<HttpResponse> {
    let device_id = parse_required_id(query.device_id.as_deref(), "device_id")?;
    let limit = parse_limit(query.limit, DEFAULT_SUGGESTIONS_LIMIT)?;

    let mangas = state.store.suggestions(device_id, limit).await?;
    respond_with_mangas(&state.covers, mangas).await
}

/// GET /api/v1/analytics/similar
///
/// Mangas similar to the subject by shared tags, author, or category.
#[get("/similar")]
pub async fn similar(
    query: web::Query<SimilarQuery>,
    state: web::Data<AnalyticsHandlerState>,
) -> Result<HttpResponse> {
    let manga_id = parse_required_id(query.manga_id.as_deref(), "manga_id")?;
    let limit = parse_limit(query.limit, DEFAULT_SIMILAR_LIMIT)?;

    let mangas = state.store.similar(manga_id, limit).await?;
    respond_with_mangas(&state.covers, mangas).await
}

async fn respond_with_mangas(covers: &CoverStorage, mangas: Vec<Manga>) -> Result<HttpResponse> {
    let mut out = Vec::with_capacity(mangas.len());
    for manga in &mangas {
        let cover_url = resolve_cover(covers, manga).await;
        out.push(MangaResponse::from_manga(manga, cover_url));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": out })))
}

/// Presign the cover image; failures degrade to an empty URL rather than
/// failing the response.
async fn resolve_cover(covers: &CoverStorage, manga: &Manga) -> String {
    if manga.cover_key.is_empty() {
        return String::new();
    }
    match covers.presigned_get_url(&manga.cover_key).await {
        Ok(url) => url,
        Err(e) => {
            warn!(manga_id = %manga.id, error = %e, "cover presign failed");
            String::new()
        }
    }
}

fn parse_limit(raw: Option<i64>, default: i64) -> Result<i64> {
    match raw {
        None => Ok(default),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(AnalyticsError::LimitOutOfRange {
            got: n,
            max: MAX_LIMIT,
        }),
    }
}

fn parse_required_id(raw: Option<&str>, name: &'static str) -> Result<Uuid> {
    let raw = raw.ok_or(AnalyticsError::MissingParam(name))?;
    Uuid::parse_str(raw).map_err(|_| AnalyticsError::MalformedId(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_limit_defaults_when_absent() {
        assert_eq!(parse_limit(None, 12).unwrap(), 12);
        assert_eq!(parse_limit(None, 8).unwrap(), 8);
    }

    #[test]
    fn parse_limit_accepts_bounds() {
        assert_eq!(parse_limit(Some(1), 12).unwrap(), 1);
        assert_eq!(parse_limit(Some(50), 12).unwrap(), 50);
    }

    #[test]
    fn parse_limit_rejects_out_of_range() {
        assert!(parse_limit(Some(0), 12).is_err());
        assert!(parse_limit(Some(51), 12).is_err());
        assert!(parse_limit(Some(-3), 12).is_err());
    }

    #[test]
    fn parse_required_id_validates() {
        assert!(parse_required_id(None, "device_id").is_err());
        assert!(parse_required_id(Some("nope"), "device_id").is_err());
        assert!(parse_required_id(Some("7c0a1c9e-63cf-4d0e-9a11-0d3f6a3a3a3a"), "device_id").is_ok());
    }
}
