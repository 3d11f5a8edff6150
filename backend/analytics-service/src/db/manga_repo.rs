use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Manga, MangaMeta};

/// Read-only access to the content-owned `mangas` table.
///
/// The analytics service never writes manga rows; it only resolves ids
/// surfaced by the trending index and runs the ranked recommendation
/// queries. All queries bind Postgres arrays so a single round trip covers
/// the whole candidate set.
pub struct MangaRepo {
    pool: PgPool,
}

impl MangaRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch full manga records for a set of ids. Order is unspecified;
    /// callers re-order as needed.
    pub async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Manga>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mangas = sqlx::query_as::<_, Manga>(
            r#"
            SELECT id, title, slug, description, status, tags, author, category,
                   cover_key, created_at, updated_at
            FROM mangas
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(mangas)
    }

    /// Fetch only the similarity-relevant attributes of one manga.
    pub async fn fetch_meta(&self, id: Uuid) -> Result<Option<MangaMeta>> {
        let row = sqlx::query_as::<_, (Vec<String>, String, String)>(
            r#"SELECT tags, author, category FROM mangas WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(tags, author, category)| MangaMeta {
            tags,
            author,
            category,
        }))
    }

    /// Personalised suggestion candidates: anything matching the top
    /// interests that the device has not already seen, newest first.
    ///
    /// Each arm of the disjunction is guarded by a cardinality check so an
    /// empty top-list can never match (and an empty author/category column
    /// never matches an empty filter value).
    pub async fn query_suggestions(
        &self,
        tags: &[String],
        authors: &[String],
        categories: &[String],
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Manga>> {
        let mangas = sqlx::query_as::<_, Manga>(
            r#"
            SELECT id, title, slug, description, status, tags, author, category,
                   cover_key, created_at, updated_at
            FROM mangas
            WHERE id != ALL($4)
              AND (
                    (cardinality($1::text[]) > 0 AND tags && $1::text[])
                 OR (cardinality($2::text[]) > 0 AND author <> '' AND author = ANY($2::text[]))
                 OR (cardinality($3::text[]) > 0 AND category <> '' AND category = ANY($3::text[]))
              )
            ORDER BY created_at DESC
            LIMIT $5
            "#,
        )
        .bind(tags)
        .bind(authors)
        .bind(categories)
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(mangas)
    }

    /// Mangas sharing a tag, author, or category with the subject,
    /// excluding the subject itself, newest first.
    pub async fn query_similar(
        &self,
        subject: Uuid,
        tags: &[String],
        author: &str,
        category: &str,
        limit: i64,
    ) -> Result<Vec<Manga>> {
        let mangas = sqlx::query_as::<_, Manga>(
            r#"
            SELECT id, title, slug, description, status, tags, author, category,
                   cover_key, created_at, updated_at
            FROM mangas
            WHERE id <> $1
              AND (
                    tags && $2::text[]
                 OR ($3 <> '' AND author = $3)
                 OR ($4 <> '' AND category = $4)
              )
            ORDER BY created_at DESC
            LIMIT $5
            "#,
        )
        .bind(subject)
        .bind(tags)
        .bind(author)
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(mangas)
    }
}
