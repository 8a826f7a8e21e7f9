#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;
pub mod library;

pub use quiz_core::Clock;

pub use api::{ApiConfig, QuizApiClient, QuizSource, UrlValidation};
pub use app_services::{AppServices, CacheBackend};
pub use error::{ApiError, AppServicesError, LibraryError};
pub use library::{HistoryListing, QuizLibraryService};
