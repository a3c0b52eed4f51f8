use thiserror::Error;

use crate::fetcher::FetchError;

#[derive(Error, Debug)]
pub enum RanksnapError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RanksnapError>;
