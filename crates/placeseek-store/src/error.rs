//! Error types for placeseek-store

use placeseek_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Place not found: {id} (alt label {alt_label:?})")]
    NotFound { id: i64, alt_label: String },

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Database is closed")]
    Closed,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
