use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::features::uploads::models::{NewUploadRecord, SortField, UploadRecord};
use crate::modules::table::UploadTable;
use crate::modules::{StoreError, StoreResult};
use crate::shared::constants::UPLOADS_TABLE;

const RECORD_COLUMNS: &str = "id, user_name, file_name, file_type, file_size, file_url, uploaded_at";

/// `file_uploads` table backed by Postgres
pub struct PgUploadTable {
    pool: PgPool,
}

impl PgUploadTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadTable for PgUploadTable {
    async fn insert_row(&self, record: NewUploadRecord) -> StoreResult<UploadRecord> {
        let sql = format!(
            r#"
            INSERT INTO {UPLOADS_TABLE} (user_name, file_name, file_type, file_size, file_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RECORD_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UploadRecord>(&sql)
            .bind(&record.user_name)
            .bind(&record.file_name)
            .bind(&record.file_type)
            .bind(record.file_size)
            .bind(&record.file_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.constraint().is_some() => StoreError::Table(format!(
                    "row violates constraint {}: {}",
                    db.constraint().unwrap_or_default(),
                    db.message()
                )),
                other => StoreError::Database(other),
            })?;

        debug!("Inserted {} row id={}", UPLOADS_TABLE, row.id);
        Ok(row)
    }

    async fn select_rows(
        &self,
        field: SortField,
        ascending: bool,
    ) -> StoreResult<Vec<UploadRecord>> {
        // The column comes from a closed enum, never from request input
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {UPLOADS_TABLE} ORDER BY {} {}",
            field.as_column(),
            if ascending { "ASC" } else { "DESC" }
        );

        let rows = sqlx::query_as::<_, UploadRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn delete_row(&self, id: Uuid) -> StoreResult<()> {
        let sql = format!("DELETE FROM {UPLOADS_TABLE} WHERE id = $1");

        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        debug!(
            "Deleted {} row id={} (rows affected: {})",
            UPLOADS_TABLE,
            id,
            result.rows_affected()
        );
        Ok(())
    }
}
