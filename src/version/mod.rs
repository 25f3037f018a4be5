//! Version tracking layer
//!
//! This module provides the core functionality for fetching catalog pages,
//! extracting the published version of a package, and reconciling it against
//! the versions recorded by previous runs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │────▶│  Extractor  │────▶│ Reconciler  │
//! │   (fetch)   │     │   (parse)   │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                   │
//!        ▼                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Transport  │     │  Numerals   │     │    Store    │
//! │  (reqwest)  │     │ (digit fold)│     │   (JSON)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`fetcher`]: `PageFetcher` trait and the single-request `Transport` seam
//! - [`fetchers`]: Catalog fetcher with timeout retries
//! - [`extractor`]: HTML field extraction
//! - [`numerals`]: Localized digit normalization
//! - [`reconciler`]: Per-run state and the reconcile step
//! - [`store`]: JSON record and progress stores
//! - [`error`]: Error types for fetching, extraction and storage

pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod fetchers;
pub mod numerals;
pub mod reconciler;
pub mod store;
