#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

#[cfg(test)]
mod test_support;

pub use repository::{InMemoryRepository, QuizRepository, Storage, StorageError};
