use std::sync::Arc;

use log::info;
use storage::repository::Storage;

use crate::Clock;
use crate::api::{ApiConfig, QuizApiClient, QuizSource};
use crate::error::AppServicesError;
use crate::library::QuizLibraryService;

/// Where cached quizzes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    InMemory,
    Sqlite(String),
}

/// Assembles app-facing services from configuration.
#[derive(Clone)]
pub struct AppServices {
    library: Arc<QuizLibraryService>,
    api: ApiConfig,
}

impl AppServices {
    /// Connect the cache and the backend client.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the cache cannot be opened or the HTTP
    /// client cannot be built.
    pub async fn new(
        api: ApiConfig,
        cache: &CacheBackend,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = match cache {
            CacheBackend::InMemory => Storage::in_memory(),
            CacheBackend::Sqlite(url) => Storage::sqlite(url).await?,
        };
        info!("quiz backend at {}, cache {cache:?}", api.base_url);

        let source: Arc<dyn QuizSource> = Arc::new(QuizApiClient::new(api.clone())?);
        let library = Arc::new(QuizLibraryService::new(source, storage.quizzes).with_clock(clock));
        Ok(Self { library, api })
    }

    #[must_use]
    pub fn library(&self) -> Arc<QuizLibraryService> {
        Arc::clone(&self.library)
    }

    #[must_use]
    pub fn api_config(&self) -> &ApiConfig {
        &self.api
    }
}
