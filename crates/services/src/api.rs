use std::env;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use quiz_core::model::{QuizDocument, QuizDocumentDraft, QuizHistoryItem, QuizId, parse_source_url};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Read `QUIZ_API_URL` and `QUIZ_API_TIMEOUT_SECS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("QUIZ_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout_secs = env::var("QUIZ_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

/// Backend verdict on an article link before generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UrlValidation {
    pub valid: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub quiz_id: Option<QuizId>,
}

#[derive(Debug, Serialize)]
struct UrlRequest<'a> {
    url: &'a str,
}

//
// ─── SOURCE TRAIT ──────────────────────────────────────────────────────────────
//

/// Remote producer of quiz documents.
#[async_trait]
pub trait QuizSource: Send + Sync {
    /// Ask whether an article can be turned into a quiz.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for invalid links or backend failures.
    async fn validate_url(&self, url: &str) -> Result<UrlValidation, ApiError>;

    /// Generate (or fetch the already generated) quiz for an article.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for invalid links, backend failures, or malformed quizzes.
    async fn generate_quiz(&self, url: &str) -> Result<QuizDocument, ApiError>;

    /// All quizzes the backend has generated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for backend failures.
    async fn history(&self) -> Result<Vec<QuizHistoryItem>, ApiError>;

    /// One quiz by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or other backend failures.
    async fn quiz_by_id(&self, id: QuizId) -> Result<QuizDocument, ApiError>;
}

//
// ─── HTTP CLIENT ───────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct QuizApiClient {
    client: Client,
    config: ApiConfig,
}

impl QuizApiClient {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be constructed.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ApiConfig::from_env())
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn check_article_url(url: &str) -> Result<(), ApiError> {
        parse_source_url(url)
            .map(|_| ())
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    async fn decode_quiz(response: Response) -> Result<QuizDocument, ApiError> {
        let response = ensure_success(response).await?;
        let draft: QuizDocumentDraft = response.json().await?;
        Ok(draft.validate()?)
    }
}

/// Map non-2xx responses to `ApiError`, using the backend's `detail` field when present.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status,
        detail: error_detail(&body),
    })
}

fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_owned(),
        },
        _ => body.trim().to_owned(),
    }
}

#[async_trait]
impl QuizSource for QuizApiClient {
    async fn validate_url(&self, url: &str) -> Result<UrlValidation, ApiError> {
        Self::check_article_url(url)?;
        debug!("validating article url {url}");
        let response = self
            .client
            .post(self.endpoint("/api/quiz/validate-url"))
            .json(&UrlRequest { url })
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn generate_quiz(&self, url: &str) -> Result<QuizDocument, ApiError> {
        Self::check_article_url(url)?;
        info!("requesting quiz generation for {url}");
        let response = self
            .client
            .post(self.endpoint("/api/quiz/generate"))
            .json(&UrlRequest { url })
            .send()
            .await?;
        Self::decode_quiz(response).await
    }

    async fn history(&self) -> Result<Vec<QuizHistoryItem>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/api/quiz/history"))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn quiz_by_id(&self, id: QuizId) -> Result<QuizDocument, ApiError> {
        debug!("fetching quiz {id}");
        let response = self
            .client
            .get(self.endpoint(&format!("/api/quiz/{id}")))
            .send()
            .await?;
        Self::decode_quiz(response).await
    }
}
