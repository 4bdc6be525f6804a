//! Error types for placeseek-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid place id: {0}")]
    InvalidId(i64),

    #[error("Feature is missing required property: {0}")]
    MissingProperty(&'static str),

    #[error("Feature property {property} has an invalid value: {reason}")]
    InvalidProperty {
        property: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
