//! Error types for placeseek-search

use placeseek_core::CoreError;
use placeseek_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown database scheme: {0}")]
    UnknownScheme(String),

    #[error("Database scheme already registered: {0}")]
    DuplicateScheme(String),

    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),

    #[error("Worker task failed: {0}")]
    Task(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<StoreError> for SearchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidConfiguration(msg) => SearchError::InvalidConfiguration(msg),
            other => SearchError::Storage(other),
        }
    }
}

impl From<tokio::task::JoinError> for SearchError {
    fn from(err: tokio::task::JoinError) -> Self {
        SearchError::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
