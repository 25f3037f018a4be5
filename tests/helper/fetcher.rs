//! Fetcher test utilities

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use version_watch::version::error::FetchError;
use version_watch::version::fetcher::PageFetcher;

/// Canned answer for one identifier
#[derive(Debug, Clone)]
pub enum StubPage {
    Html(String),
    NotFound,
    TimedOut,
}

/// Builds a page the default selectors understand
pub fn catalog_page(name: &str, version: &str) -> StubPage {
    StubPage::Html(format!(
        r#"<html><body>
            <div class="app_name"><a href="/">{}</a></div>
            <div class="version">{}</div>
        </body></html>"#,
        name, version
    ))
}

/// In-memory fetcher that records calls and the peak number of concurrent fetches
pub struct StubFetcher {
    pages: HashMap<String, StubPage>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_page(mut self, identifier: &str, page: StubPage) -> Self {
        self.pages.insert(identifier.to_string(), page);
        self
    }

    /// Every fetch sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    fn source_url(&self, identifier: &str) -> String {
        format!("https://catalog.test/1/{}", identifier)
    }

    async fn fetch_page(&self, identifier: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(identifier.to_string());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.pages.get(identifier) {
            Some(StubPage::Html(html)) => Ok(html.clone()),
            Some(StubPage::TimedOut) => Err(FetchError::TimedOut { attempts: 3 }),
            Some(StubPage::NotFound) | None => Err(FetchError::NotFound(identifier.to_string())),
        }
    }
}
