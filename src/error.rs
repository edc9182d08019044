//! Error types for kata.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KataError>;

#[derive(Debug, Error)]
pub enum KataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("question not found: {0}")]
    QuestionNotFound(String),

    #[error("submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("judge error: {0}")]
    Judge(String),

    #[error("server error: {0}")]
    Server(String),
}
