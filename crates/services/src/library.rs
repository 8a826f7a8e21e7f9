use std::sync::Arc;

use log::{debug, info, warn};
use quiz_core::model::{QuizDocument, QuizHistoryItem, QuizId};
use quiz_core::{Clock, QuizSession};
use storage::repository::{QuizRepository, StorageError};

use crate::api::QuizSource;
use crate::error::LibraryError;

/// History listing plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryListing {
    pub items: Vec<QuizHistoryItem>,
    /// Set when the backend was unreachable and the local cache answered.
    pub from_cache: bool,
}

/// Loads quiz documents, remote first for new quizzes and cache first for known ones.
#[derive(Clone)]
pub struct QuizLibraryService {
    clock: Clock,
    source: Arc<dyn QuizSource>,
    cache: Arc<dyn QuizRepository>,
}

impl QuizLibraryService {
    #[must_use]
    pub fn new(source: Arc<dyn QuizSource>, cache: Arc<dyn QuizRepository>) -> Self {
        Self {
            clock: Clock::default(),
            source,
            cache,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Open a quiz by id, preferring the local cache.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Api` if the quiz is not cached and cannot be fetched.
    pub async fn open(&self, id: QuizId) -> Result<Arc<QuizDocument>, LibraryError> {
        match self.cache.get_quiz(id).await {
            Ok(quiz) => {
                debug!("quiz {id} served from cache");
                return Ok(Arc::new(quiz));
            }
            Err(StorageError::NotFound) => {}
            Err(e) => warn!("quiz cache read failed for {id}: {e}"),
        }

        let quiz = self.source.quiz_by_id(id).await?;
        self.remember(&quiz).await;
        Ok(Arc::new(quiz))
    }

    /// Turn an article link into a quiz.
    ///
    /// Articles the backend already processed are opened by id instead of
    /// being generated again.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Rejected` when the backend refuses the link, or
    /// `LibraryError::Api` for transport and backend failures.
    pub async fn generate(&self, url: &str) -> Result<Arc<QuizDocument>, LibraryError> {
        let validation = self.source.validate_url(url).await?;
        if !validation.valid {
            let reason = validation
                .message
                .unwrap_or_else(|| "the backend did not accept this article".into());
            return Err(LibraryError::Rejected(reason));
        }

        if let (true, Some(id)) = (validation.cached, validation.quiz_id) {
            info!("article already processed as quiz {id}");
            return self.open(id).await;
        }

        let quiz = self.source.generate_quiz(url).await?;
        info!(
            "generated quiz {:?} with {} questions",
            quiz.id(),
            quiz.question_count()
        );
        self.remember(&quiz).await;
        Ok(Arc::new(quiz))
    }

    /// Past quizzes from the backend, or from the local cache when the backend
    /// cannot be reached.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Api` for backend error responses, or
    /// `LibraryError::Storage` if the fallback cache read fails too.
    pub async fn history(&self) -> Result<HistoryListing, LibraryError> {
        match self.source.history().await {
            Ok(items) => Ok(HistoryListing {
                items,
                from_cache: false,
            }),
            Err(e) if e.is_transport() => {
                warn!("quiz backend unreachable, listing cached quizzes: {e}");
                let items = self.cache.list_history().await?;
                Ok(HistoryListing {
                    items,
                    from_cache: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open a quiz and start a fresh attempt at it.
    ///
    /// # Errors
    ///
    /// Same as [`QuizLibraryService::open`].
    pub async fn start_attempt(&self, id: QuizId) -> Result<QuizSession, LibraryError> {
        let quiz = self.open(id).await?;
        Ok(QuizSession::with_clock(quiz, self.clock))
    }

    /// Drop a quiz from the local cache.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if nothing is cached under `id`.
    pub async fn forget(&self, id: QuizId) -> Result<(), LibraryError> {
        self.cache.remove_quiz(id).await?;
        Ok(())
    }

    async fn remember(&self, quiz: &QuizDocument) {
        match self.cache.upsert_quiz(quiz).await {
            Ok(()) => {}
            Err(StorageError::MissingId) => debug!("quiz without backend id not cached"),
            Err(e) => warn!("failed to cache quiz {:?}: {e}", quiz.id()),
        }
    }
}
