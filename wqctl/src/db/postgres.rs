//! PostgreSQL record store.
//!
//! Documents live in the `records` table as JSONB, keyed by (kind, id). Counters used for code
//! generation live in `code_sequences` and are advanced with a single upsert, so concurrent
//! generators never observe the same value.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};
use tracing::instrument;

use crate::config::PoolSettings;
use crate::db::errors::Result;
use crate::db::store::{Document, RecordKind, RecordStore, SEQUENCE_MAX};

/// Get the record store migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    organization_id: String,
    status: Option<String>,
    body: Json<serde_json::Value>,
}

impl DocumentRow {
    fn into_document(self, kind: RecordKind) -> Document {
        Document {
            kind,
            id: self.id,
            organization_id: self.organization_id,
            status: self.status,
            body: self.body.0,
        }
    }
}

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and run pending migrations
    #[instrument(skip_all, err)]
    pub async fn connect(url: &str, pool: &PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool.max_connections)
            .min_connections(pool.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(pool.acquire_timeout_secs))
            .connect(url)
            .await?;

        migrator().run(&pool).await?;

        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[instrument(skip(self), err)]
    async fn find_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, organization_id, status, body FROM records WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.into_document(kind)))
    }

    #[instrument(skip(self), err)]
    async fn find_all_by_organization(&self, kind: RecordKind, organization_id: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, organization_id, status, body FROM records
            WHERE kind = $1 AND organization_id = $2
            ORDER BY inserted_at, id
            "#,
        )
        .bind(kind.as_str())
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into_document(kind)).collect())
    }

    #[instrument(skip(self), err)]
    async fn find_all_by_organization_and_status(
        &self,
        kind: RecordKind,
        organization_id: &str,
        status: &str,
    ) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, organization_id, status, body FROM records
            WHERE kind = $1 AND organization_id = $2 AND status = $3
            ORDER BY inserted_at, id
            "#,
        )
        .bind(kind.as_str())
        .bind(organization_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into_document(kind)).collect())
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self, kind: RecordKind) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, organization_id, status, body FROM records WHERE kind = $1 ORDER BY inserted_at, id",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into_document(kind)).collect())
    }

    #[instrument(skip(self, document), fields(kind = %document.kind, id = %document.id), err)]
    async fn save(&self, document: Document) -> Result<Document> {
        sqlx::query(
            r#"
            INSERT INTO records (kind, id, organization_id, status, body)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (kind, id) DO UPDATE
            SET organization_id = EXCLUDED.organization_id,
                status = EXCLUDED.status,
                body = EXCLUDED.body
            "#,
        )
        .bind(document.kind.as_str())
        .bind(&document.id)
        .bind(&document.organization_id)
        .bind(&document.status)
        .bind(Json(&document.body))
        .execute(&self.pool)
        .await?;

        Ok(document)
    }

    #[instrument(skip(self), err)]
    async fn delete_by_id(&self, kind: RecordKind, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM records WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn advance_sequence(&self, name: &str, floor: u32) -> Result<u32> {
        if floor >= SEQUENCE_MAX {
            return Err(anyhow!("sequence {name} is exhausted").into());
        }
        let floor = i32::try_from(floor).map_err(|_| anyhow!("sequence floor {floor} out of range"))?;

        let value: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO code_sequences (name, last_value) VALUES ($1, $2 + 1)
            ON CONFLICT (name) DO UPDATE
            SET last_value = GREATEST(code_sequences.last_value, $2) + 1
            WHERE code_sequences.last_value < 2147483647
            RETURNING last_value
            "#,
        )
        .bind(name)
        .bind(floor)
        .fetch_optional(&self.pool)
        .await?;
        let value = value.ok_or_else(|| anyhow!("sequence {name} is exhausted"))?;

        u32::try_from(value).map_err(|_| anyhow!("sequence {name} holds negative value {value}").into())
    }
}
