use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Manga record as read from the content-owned `mangas` table.
///
/// This service only reads manga rows; all writes belong to the content
/// service. `cover_key` is the object-store key of the cover image and is
/// resolved to a presigned URL at response time.
#[derive(Debug, Clone, FromRow)]
pub struct Manga {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub status: String,
    pub tags: Vec<String>,
    pub author: String,
    pub category: String,
    pub cover_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The subset of manga attributes that drives interest profiles and
/// similarity: tags (set-like), author, and category. Author and category
/// may be empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangaMeta {
    pub tags: Vec<String>,
    pub author: String,
    pub category: String,
}

/// Manga shape exposed by the analytics read endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct MangaResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub status: String,
    pub tags: Vec<String>,
    pub author: String,
    pub category: String,
    pub cover_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MangaResponse {
    pub fn from_manga(manga: &Manga, cover_url: String) -> Self {
        Self {
            id: manga.id,
            title: manga.title.clone(),
            slug: manga.slug.clone(),
            description: manga.description.clone(),
            status: manga.status.clone(),
            tags: manga.tags.clone(),
            author: manga.author.clone(),
            category: manga.category.clone(),
            cover_url,
            created_at: manga.created_at,
            updated_at: manga.updated_at,
        }
    }
}
