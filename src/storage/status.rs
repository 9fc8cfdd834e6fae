use chrono::{DateTime, Utc};

use crate::Result;

/// The singleton refresh-status row. Fixed id, created on first refresh,
/// overwritten on every one after, never deleted.
#[derive(Clone)]
pub struct StatusStorage {
    pool: sqlx::PgPool,
}

impl StatusStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn touch(&self) -> Result<()> {
        let query = "INSERT INTO app_status (id, last_refreshed_at) \
             VALUES (1, NOW()) \
             ON CONFLICT (id) DO UPDATE SET last_refreshed_at = NOW()";
        sqlx::query(query).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn last_refreshed(&self) -> Result<Option<DateTime<Utc>>> {
        let query = "SELECT last_refreshed_at FROM app_status WHERE id = 1";
        let timestamp = sqlx::query_scalar::<_, DateTime<Utc>>(query)
            .fetch_optional(&self.pool)
            .await?;
        Ok(timestamp)
    }
}
