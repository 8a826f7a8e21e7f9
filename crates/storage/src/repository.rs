use async_trait::async_trait;
use quiz_core::model::{QuizDocument, QuizHistoryItem, QuizId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("quiz has no backend id and cannot be cached")]
    MissingId,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Local cache of quiz documents the backend has produced.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist or replace a quiz document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingId` if the document has no backend id or
    /// timestamp, or other storage errors.
    async fn upsert_quiz(&self, quiz: &QuizDocument) -> Result<(), StorageError>;

    /// Fetch a cached quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_quiz(&self, id: QuizId) -> Result<QuizDocument, StorageError>;

    /// List cached quizzes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing cannot be read.
    async fn list_history(&self) -> Result<Vec<QuizHistoryItem>, StorageError>;

    /// Drop a cached quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing was cached under `id`.
    async fn remove_quiz(&self, id: QuizId) -> Result<(), StorageError>;
}

/// Sort key shared by every adapter: newest first, ties by descending id.
pub(crate) fn sort_history(items: &mut [QuizHistoryItem]) {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    quizzes: Arc<Mutex<HashMap<QuizId, QuizDocument>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn upsert_quiz(&self, quiz: &QuizDocument) -> Result<(), StorageError> {
        let item = quiz.history_item().ok_or(StorageError::MissingId)?;
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(item.id, quiz.clone());
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<QuizDocument, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_history(&self) -> Result<Vec<QuizHistoryItem>, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut items: Vec<_> = guard.values().filter_map(QuizDocument::history_item).collect();
        sort_history(&mut items);
        Ok(items)
    }

    async fn remove_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

/// Quiz cache behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn QuizRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let quizzes: Arc<dyn QuizRepository> = Arc::new(InMemoryRepository::new());
        Self { quizzes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_quiz;

    #[tokio::test]
    async fn round_trips_quiz() {
        let repo = InMemoryRepository::new();
        let quiz = build_quiz(1, 0);
        repo.upsert_quiz(&quiz).await.unwrap();

        let fetched = repo.get_quiz(QuizId::new(1)).await.unwrap();
        assert_eq!(fetched, quiz);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let repo = InMemoryRepository::new();
        repo.upsert_quiz(&build_quiz(1, 0)).await.unwrap();
        repo.upsert_quiz(&build_quiz(2, 60)).await.unwrap();
        repo.upsert_quiz(&build_quiz(3, 30)).await.unwrap();

        let ids: Vec<u64> = repo
            .list_history()
            .await
            .unwrap()
            .iter()
            .map(|item| item.id.value())
            .collect();
        assert_eq!(ids, [2, 3, 1]);
    }

    #[tokio::test]
    async fn missing_quiz_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get_quiz(QuizId::new(9)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        let err = repo.remove_quiz(QuizId::new(9)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn quiz_without_id_is_rejected() {
        let repo = InMemoryRepository::new();
        let mut draft = quiz_core::model::QuizDocumentDraft::from(build_quiz(1, 0));
        draft.id = None;
        let quiz = draft.validate().unwrap();
        let err = repo.upsert_quiz(&quiz).await.unwrap_err();
        assert!(matches!(err, StorageError::MissingId));
    }
}
