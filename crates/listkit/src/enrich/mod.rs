//! Keyword enrichment: one browser session works through a template table,
//! submitting each populated keyword slot to the research site and storing
//! the top results next to the row.

pub mod browser_state;
pub mod chromium;
pub mod error;
pub mod page;
pub mod session;
pub mod wait;

#[cfg(test)]
pub(crate) mod fake;

use std::path::Path;
use std::time::Duration;

use tracing::{info_span, Instrument};

use crate::config::{EnrichmentConfig, PathsConfig};
use crate::error::Result;
use crate::progress::ProgressReporter;
use crate::sanitize;
use crate::storage::OutputStorage;
use crate::table::{load_table, TableSchema};

pub use browser_state::{BrowserState, StoredCookie};
pub use chromium::ChromiumPage;
pub use error::EnrichError;
pub use page::ResearchPage;
pub use session::{
    enriched_header, query_text, EnrichSettings, EnrichmentReport, EnrichmentSession,
    ENRICHED_BASE_NAME, NO_RESULTS,
};

/// Loads `input`, drives a Chromium session over it, and writes the
/// enriched table into the export directory.
///
/// The table and the stored browser session are read before the browser is
/// launched, so bad inputs fail without starting Chromium.
pub async fn run_enrichment(
    input: &Path,
    enrichment: &EnrichmentConfig,
    paths: &PathsConfig,
    progress: &dyn ProgressReporter,
) -> Result<EnrichmentReport> {
    let span = info_span!("enrich", input = %sanitize::redact_path(input));
    async {
        let table = load_table(input, &TableSchema::enrichment())?;
        let state = BrowserState::load(&paths.session_dir()).await?;
        let page = ChromiumPage::launch(enrichment, &state).await?;

        let session = EnrichmentSession::new(page, EnrichSettings::from(enrichment));
        session
            .wait_for_initial_render(Duration::from_secs(enrichment.initial_render_secs))
            .await;

        let storage = OutputStorage::new(paths.export_dir());
        session.run(table, &storage, progress).await
    }
    .instrument(span)
    .await
}
