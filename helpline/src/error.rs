//! Error types shared across the helpline runtime.
//!
//! Responsibilities:
//! - One domain error enum for the library; binaries wrap it in anyhow.
//! - Keep conversions from std/serde errors in one place.

use thiserror::Error;

pub type HelplineResult<T> = Result<T, HelplineError>;

/// Error type for the helpline runtime.
#[derive(Debug, Error)]
pub enum HelplineError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Course not found: {0}")]
    CourseNotFound(String),
    #[error("LLM provider error: {0}")]
    Llm(String),
    #[error("Token error: {0}")]
    Token(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Generic(String),
}

impl From<std::io::Error> for HelplineError {
    fn from(e: std::io::Error) -> Self {
        HelplineError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for HelplineError {
    fn from(e: serde_json::Error) -> Self {
        HelplineError::Serde(e.to_string())
    }
}

impl From<reqwest::Error> for HelplineError {
    fn from(e: reqwest::Error) -> Self {
        HelplineError::Llm(e.to_string())
    }
}
