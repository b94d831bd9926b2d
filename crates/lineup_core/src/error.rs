//! Error types for the Lineup core

use std::io;
use thiserror::Error;

/// Lineup error type
///
/// Problems with user-supplied patterns and rules are never reported here;
/// they are collected into a [`crate::validation::ValidationResult`].
#[derive(Error, Debug)]
pub enum LineupError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LineupError>;
