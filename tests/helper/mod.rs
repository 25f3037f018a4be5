#![allow(dead_code)]

pub mod fetcher;
pub mod files;

#[allow(unused_imports)]
pub use fetcher::{StubFetcher, StubPage, catalog_page};
#[allow(unused_imports)]
pub use files::{TestFiles, create_test_files};
