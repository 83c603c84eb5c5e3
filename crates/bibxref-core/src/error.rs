use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XrefError {
    #[error("input catalog not found: {0}")]
    InputNotFound(PathBuf),

    #[error("required column missing from header: {0}")]
    MissingColumn(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XrefError>;
