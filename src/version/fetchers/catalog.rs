//! Catalog page fetcher over HTTP with bounded retries on timeout

use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{FETCH_MAX_ATTEMPTS, FetchConfig, RETRY_DELAY_MS};
use crate::version::error::FetchError;
use crate::version::fetcher::{PageFetcher, Transport, TransportFailure, TransportResponse};

/// How often and how patiently a timed-out request is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(FETCH_MAX_ATTEMPTS, Duration::from_millis(RETRY_DELAY_MS))
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }
}

/// reqwest-backed transport
///
/// The connection pool keeps as many idle connections per host as the
/// admission gate lets requests through, so admitted requests do not queue
/// behind each other inside the client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .pool_max_idle_per_host(idle_pool_size(config.concurrency))
            .build()?;
        Ok(Self { client })
    }
}

/// Idle connections kept per host; zero would disable pooling
fn idle_pool_size(concurrency: usize) -> usize {
    concurrency.max(1)
}

fn classify(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::Other(err.to_string())
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportFailure> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();

        if !status.is_success() {
            return Ok(TransportResponse {
                status,
                body: String::new(),
            });
        }

        // The client timeout also covers reading the body
        let body = response.text().await.map_err(classify)?;
        Ok(TransportResponse { status, body })
    }
}

/// Fetcher for `<base_url>/<identifier>` pages
pub struct CatalogFetcher<T: Transport = HttpTransport> {
    transport: T,
    base_url: String,
    retry: RetryPolicy,
}

impl<T: Transport> CatalogFetcher<T> {
    pub fn new(transport: T, base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }
}

impl CatalogFetcher<HttpTransport> {
    /// Creates a fetcher with an HTTP transport built from the fetch configuration
    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            HttpTransport::new(config)?,
            &config.base_url,
            RetryPolicy::from(config),
        ))
    }
}

#[async_trait::async_trait]
impl<T: Transport> PageFetcher for CatalogFetcher<T> {
    fn source_url(&self, identifier: &str) -> String {
        format!("{}/{}", self.base_url, identifier)
    }

    async fn fetch_page(&self, identifier: &str) -> Result<String, FetchError> {
        let url = self.source_url(identifier);
        let max_attempts = self.retry.max_attempts;
        let mut attempt = 1;

        loop {
            match self.transport.get(&url).await {
                Ok(TransportResponse { status, .. }) if status == StatusCode::NOT_FOUND => {
                    return Err(FetchError::NotFound(identifier.to_string()));
                }
                Ok(TransportResponse { status, .. }) if !status.is_success() => {
                    return Err(FetchError::FetchFailed(status));
                }
                Ok(TransportResponse { body, .. }) => {
                    debug!("Fetched {} on attempt {}", url, attempt);
                    return Ok(body);
                }
                Err(TransportFailure::Timeout) if attempt < max_attempts => {
                    warn!(
                        "Timeout for {}, retrying ({}/{})",
                        identifier, attempt, max_attempts
                    );
                    sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(TransportFailure::Timeout) => {
                    return Err(FetchError::TimedOut { attempts: attempt });
                }
                Err(TransportFailure::Other(message)) => {
                    return Err(FetchError::Transport(message));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use rstest::rstest;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that replays a fixed list of results and counts calls
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<TransportResponse, TransportFailure>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<TransportResponse, TransportFailure>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, _url: &str) -> Result<TransportResponse, TransportFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportFailure::Other("script exhausted".to_string())))
        }
    }

    fn ok(body: &str) -> Result<TransportResponse, TransportFailure> {
        Ok(TransportResponse {
            status: StatusCode::OK,
            body: body.to_string(),
        })
    }

    fn status(status: StatusCode) -> Result<TransportResponse, TransportFailure> {
        Ok(TransportResponse {
            status,
            body: String::new(),
        })
    }

    fn fetcher(
        script: Vec<Result<TransportResponse, TransportFailure>>,
    ) -> CatalogFetcher<ScriptedTransport> {
        CatalogFetcher::new(
            ScriptedTransport::new(script),
            "https://catalog.test/1/",
            RetryPolicy::new(3, Duration::ZERO),
        )
    }

    #[test]
    fn source_url_appends_identifier_to_base_url() {
        let fetcher = fetcher(vec![]);

        assert_eq!(
            fetcher.source_url("com.example.app"),
            "https://catalog.test/1/com.example.app"
        );
    }

    #[tokio::test]
    async fn fetch_page_returns_body_on_success() {
        let fetcher = fetcher(vec![ok("<html></html>")]);

        let result = fetcher.fetch_page("com.example.app").await.unwrap();

        assert_eq!(result, "<html></html>");
        assert_eq!(fetcher.transport.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_page_returns_not_found_without_retry() {
        let fetcher = fetcher(vec![status(StatusCode::NOT_FOUND), ok("unused")]);

        let result = fetcher.fetch_page("com.gone.app").await;

        assert!(matches!(result, Err(FetchError::NotFound(id)) if id == "com.gone.app"));
        assert_eq!(fetcher.transport.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_page_returns_fetch_failed_for_other_statuses_without_retry() {
        let fetcher = fetcher(vec![status(StatusCode::BAD_GATEWAY), ok("unused")]);

        let result = fetcher.fetch_page("com.example.app").await;

        assert!(matches!(
            result,
            Err(FetchError::FetchFailed(StatusCode::BAD_GATEWAY))
        ));
        assert_eq!(fetcher.transport.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_page_succeeds_after_two_timeouts() {
        let fetcher = fetcher(vec![
            Err(TransportFailure::Timeout),
            Err(TransportFailure::Timeout),
            ok("third time"),
        ]);

        let result = fetcher.fetch_page("com.example.app").await.unwrap();

        assert_eq!(result, "third time");
        assert_eq!(fetcher.transport.calls(), 3);
    }

    #[tokio::test]
    async fn fetch_page_gives_up_after_retry_budget() {
        let fetcher = fetcher(vec![
            Err(TransportFailure::Timeout),
            Err(TransportFailure::Timeout),
            Err(TransportFailure::Timeout),
            ok("never reached"),
        ]);

        let result = fetcher.fetch_page("com.example.app").await;

        assert!(matches!(result, Err(FetchError::TimedOut { attempts: 3 })));
        assert_eq!(fetcher.transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_page_waits_between_timed_out_attempts_only() {
        let fetcher = CatalogFetcher::new(
            ScriptedTransport::new(vec![
                Err(TransportFailure::Timeout),
                Err(TransportFailure::Timeout),
                Err(TransportFailure::Timeout),
            ]),
            "https://catalog.test/1",
            RetryPolicy::new(3, Duration::from_secs(2)),
        );
        let start = tokio::time::Instant::now();

        let result = fetcher.fetch_page("com.example.app").await;

        assert!(matches!(result, Err(FetchError::TimedOut { attempts: 3 })));
        assert_eq!(fetcher.transport.calls(), 3);
        // Two gaps between three attempts, none after the last one
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_page_waits_once_before_successful_retry() {
        let fetcher = CatalogFetcher::new(
            ScriptedTransport::new(vec![Err(TransportFailure::Timeout), ok("second time")]),
            "https://catalog.test/1",
            RetryPolicy::new(3, Duration::from_secs(2)),
        );
        let start = tokio::time::Instant::now();

        let result = fetcher.fetch_page("com.example.app").await.unwrap();

        assert_eq!(result, "second time");
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn fetch_page_does_not_retry_transport_errors() {
        let fetcher = fetcher(vec![
            Err(TransportFailure::Other("connection refused".to_string())),
            ok("unused"),
        ]);

        let result = fetcher.fetch_page("com.example.app").await;

        assert!(matches!(result, Err(FetchError::Transport(msg)) if msg == "connection refused"));
        assert_eq!(fetcher.transport.calls(), 1);
    }

    #[test]
    fn retry_policy_always_allows_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO);

        assert_eq!(policy.max_attempts, 1);
    }

    fn http_fetcher(base_url: &str) -> CatalogFetcher<HttpTransport> {
        let config = FetchConfig {
            base_url: base_url.to_string(),
            retry_delay_ms: 0,
            ..FetchConfig::default()
        };
        CatalogFetcher::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn http_fetch_page_returns_html_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/com.example.app")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(r#"<div class="version">۱.۲</div>"#)
            .create_async()
            .await;

        let fetcher = http_fetcher(&server.url());
        let result = fetcher.fetch_page("com.example.app").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, r#"<div class="version">۱.۲</div>"#);
    }

    #[tokio::test]
    async fn http_fetch_page_returns_not_found_after_single_request() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/com.gone.app")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let fetcher = http_fetcher(&server.url());
        let result = fetcher.fetch_page("com.gone.app").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn http_fetch_page_returns_fetch_failed_for_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/com.example.app")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let fetcher = http_fetcher(&server.url());
        let result = fetcher.fetch_page("com.example.app").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(FetchError::FetchFailed(StatusCode::SERVICE_UNAVAILABLE))
        ));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(10, 10)]
    fn idle_pool_size_follows_gate_capacity(#[case] concurrency: usize, #[case] expected: usize) {
        assert_eq!(idle_pool_size(concurrency), expected);
    }

    #[tokio::test]
    async fn http_transport_keeps_pooling_when_concurrency_is_zero() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/com.example.app")
            .with_status(200)
            .with_body("ok")
            .expect(2)
            .create_async()
            .await;

        let config = FetchConfig {
            base_url: server.url(),
            concurrency: 0,
            ..FetchConfig::default()
        };
        let fetcher = CatalogFetcher::from_config(&config).unwrap();

        assert_eq!(fetcher.fetch_page("com.example.app").await.unwrap(), "ok");
        assert_eq!(fetcher.fetch_page("com.example.app").await.unwrap(), "ok");
        mock.assert_async().await;
    }
}
