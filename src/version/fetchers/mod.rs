//! Fetcher implementations for downloading catalog pages

pub mod catalog;

pub use catalog::{CatalogFetcher, HttpTransport, RetryPolicy};
