use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use exam_core::model::{ExamId, ProgressSnapshot};

use super::SqliteProgressStore;
use crate::repository::{ProgressStore, StorageError, progress_key};

fn connection_error(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn load(&self, exam_id: ExamId) -> Result<Option<ProgressSnapshot>, StorageError> {
        let row = sqlx::query("SELECT value FROM exam_progress WHERE key = ?1")
            .bind(progress_key(exam_id))
            .fetch_optional(self.pool())
            .await
            .map_err(connection_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row.try_get("value").map_err(connection_error)?;
        serde_json::from_str(&value)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn save(&self, exam_id: ExamId, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        let value = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        sqlx::query(
            r"
                INSERT INTO exam_progress (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(progress_key(exam_id))
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn clear(&self, exam_id: ExamId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM exam_progress WHERE key = ?1")
            .bind(progress_key(exam_id))
            .execute(self.pool())
            .await
            .map_err(connection_error)?;

        Ok(())
    }
}
