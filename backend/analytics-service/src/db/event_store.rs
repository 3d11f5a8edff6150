use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::tracking::EventRow;

/// Persistence for enriched tracking events.
///
/// Deliberately narrow: a columnar backend (ClickHouse) can replace the
/// Postgres implementation without touching the ingestion path.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, rows: &[EventRow]) -> Result<()>;
}

/// Event store writing to the service-owned `events` table.
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert(&self, rows: &[EventRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        // One multi-value insert per batch
        let mut query = sqlx::QueryBuilder::new(
            "INSERT INTO events \
             (device_id, user_id, event, properties, referrer, ip_hash, user_agent, created_at) ",
        );
        query.push_values(rows, |mut values, row| {
            values
                .push_bind(row.device_id)
                .push_bind(row.user_id)
                .push_bind(&row.event)
                .push_bind(&row.properties)
                .push_bind(&row.referrer)
                .push_bind(&row.ip_hash)
                .push_bind(&row.user_agent)
                .push_bind(row.created_at);
        });
        query.build().execute(&self.pool).await?;

        Ok(())
    }
}
