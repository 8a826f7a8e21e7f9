use quiz_core::model::{QuizDocument, QuizHistoryItem, QuizId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn quiz_id_to_i64(id: QuizId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("quiz_id overflow".into()))
}

pub(crate) fn quiz_id_from_i64(v: i64) -> Result<QuizId, StorageError> {
    u64::try_from(v)
        .map(QuizId::new)
        .map_err(|_| StorageError::Serialization("quiz_id sign overflow".into()))
}

/// Documents are stored as the backend's JSON shape and re-validated on read.
pub(crate) fn document_to_json(quiz: &QuizDocument) -> Result<String, StorageError> {
    serde_json::to_string(quiz).map_err(ser)
}

pub(crate) fn map_document_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizDocument, StorageError> {
    let json: String = row.try_get("document").map_err(ser)?;
    serde_json::from_str(&json).map_err(ser)
}

pub(crate) fn map_history_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<QuizHistoryItem, StorageError> {
    let question_count: i64 = row.try_get("question_count").map_err(ser)?;
    Ok(QuizHistoryItem {
        id: quiz_id_from_i64(row.try_get("id").map_err(ser)?)?,
        url: row.try_get("url").map_err(ser)?,
        title: row.try_get("title").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
        question_count: u32::try_from(question_count)
            .map_err(|_| StorageError::Serialization(format!("invalid question_count: {question_count}")))?,
    })
}
