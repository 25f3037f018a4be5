//! Field extraction from catalog pages

use scraper::{ElementRef, Html, Selector};

use crate::config::SelectorConfig;
use crate::version::error::ExtractorError;
use crate::version::numerals::normalize_digits;

/// Fields pulled out of a single catalog page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Display name, empty when the page has none
    pub name: String,
    /// Version with ASCII digits, empty when the page has none
    pub version: String,
}

impl ExtractedFields {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

/// Extracts display name and version from catalog HTML
#[derive(Debug, Clone)]
pub struct Extractor {
    name_selector: Selector,
    version_selector: Selector,
}

impl Extractor {
    pub fn new(config: &SelectorConfig) -> Result<Self, ExtractorError> {
        Ok(Self {
            name_selector: compile_selector(&config.display_name)?,
            version_selector: compile_selector(&config.version)?,
        })
    }

    /// Never fails: a missing or malformed element yields an empty field.
    pub fn extract(&self, html: &str) -> ExtractedFields {
        let document = Html::parse_document(html);

        let name = document
            .select(&self.name_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let version = document
            .select(&self.version_selector)
            .next()
            .map(|element| normalize_digits(&element_text(element)))
            .unwrap_or_default();

        ExtractedFields { name, version }
    }
}

fn compile_selector(selector: &str) -> Result<Selector, ExtractorError> {
    Selector::parse(selector).map_err(|e| ExtractorError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
