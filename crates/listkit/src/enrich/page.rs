use async_trait::async_trait;

use super::error::EnrichError;

/// The handful of page interactions keyword research needs.
///
/// Implemented over CDP by [`super::chromium::ChromiumPage`]; tests use a
/// scripted in-memory page.
#[async_trait]
pub trait ResearchPage: Send + Sync {
    /// Number of elements currently matching `selector`.
    async fn count_elements(&self, selector: &str) -> Result<usize, EnrichError>;

    /// Empties the `index`-th match of `selector` and gives it focus.
    async fn clear_and_focus(&self, selector: &str, index: usize) -> Result<(), EnrichError>;

    /// Types into the focused element.
    async fn type_text(&self, text: &str) -> Result<(), EnrichError>;

    async fn press_enter(&self) -> Result<(), EnrichError>;

    /// Trimmed text content of the first `limit` matches of `selector`.
    async fn read_texts(&self, selector: &str, limit: usize) -> Result<Vec<String>, EnrichError>;

    async fn close(&self) -> Result<(), EnrichError>;
}
