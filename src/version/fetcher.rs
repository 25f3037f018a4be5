//! Fetcher trait for downloading catalog pages, and the transport seam below it

#[cfg(test)]
use mockall::automock;

use reqwest::StatusCode;

use crate::version::error::FetchError;

/// Trait for fetching the catalog page of a package
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the page URL for a package identifier
    fn source_url(&self, identifier: &str) -> String;

    /// Fetches the HTML page for a package
    ///
    /// # Returns
    /// * `Ok(String)` - The response body of a 2xx response
    /// * `Err(FetchError::NotFound)` - The catalog answered 404
    /// * `Err(FetchError)` - Any other failure, after retries where applicable
    async fn fetch_page(&self, identifier: &str) -> Result<String, FetchError>;
}

/// Response of a single GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    /// Empty unless the status is a success
    pub body: String,
}

/// Failure of a single GET before a complete response was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The per-attempt timeout elapsed
    Timeout,
    /// Connection, DNS, TLS or body decoding failure
    Other(String),
}

/// One HTTP GET, without any retry logic
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportFailure>;
}

#[async_trait::async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<F> {
    fn source_url(&self, identifier: &str) -> String {
        (**self).source_url(identifier)
    }

    async fn fetch_page(&self, identifier: &str) -> Result<String, FetchError> {
        (**self).fetch_page(identifier).await
    }
}
