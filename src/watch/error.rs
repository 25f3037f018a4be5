use thiserror::Error;

use crate::version::error::{ExtractorError, StoreError};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Report error: {0}")]
    Report(#[from] tera::Error),
}
