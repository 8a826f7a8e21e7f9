use chrono::Utc;
use quiz_core::model::{QuizDocument, QuizHistoryItem, QuizId};

use super::SqliteRepository;
use super::mapping::{document_to_json, map_document_row, map_history_row, quiz_id_to_i64};
use crate::repository::{QuizRepository, StorageError};

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn upsert_quiz(&self, quiz: &QuizDocument) -> Result<(), StorageError> {
        let item = quiz.history_item().ok_or(StorageError::MissingId)?;
        let id = quiz_id_to_i64(item.id)?;
        let document = document_to_json(quiz)?;

        sqlx::query(
            r"
                INSERT INTO quizzes (id, url, title, created_at, question_count, document, cached_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    url = excluded.url,
                    title = excluded.title,
                    created_at = excluded.created_at,
                    question_count = excluded.question_count,
                    document = excluded.document,
                    cached_at = excluded.cached_at
            ",
        )
        .bind(id)
        .bind(&item.url)
        .bind(&item.title)
        .bind(item.created_at)
        .bind(i64::from(item.question_count))
        .bind(document)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<QuizDocument, StorageError> {
        let row = sqlx::query("SELECT document FROM quizzes WHERE id = ?1")
            .bind(quiz_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        map_document_row(&row)
    }

    async fn list_history(&self) -> Result<Vec<QuizHistoryItem>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, url, title, created_at, question_count
                FROM quizzes
                ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_history_row).collect()
    }

    async fn remove_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM quizzes WHERE id = ?1")
            .bind(quiz_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
