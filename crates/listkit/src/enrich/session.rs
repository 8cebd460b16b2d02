use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::EnrichmentConfig;
use crate::error::Result;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::storage::OutputStorage;
use crate::table::{columns, write_table_numbered, KeywordSlot, Record, Table};

use super::error::EnrichError;
use super::page::ResearchPage;
use super::wait::{poll_until, settle, SettleTiming, Settled};

/// Base file name of the enriched table.
pub const ENRICHED_BASE_NAME: &str = "completed-KeywordResearch";

/// Written in place of results when a query yields nothing readable.
pub const NO_RESULTS: &str = "No results";

pub const KEYWORD_INPUT: &str = r#"input[name="keywords"]"#;
pub const RESULT_ANCHORS: &str = "tr > td > a[title]";

/// The page has two keyword inputs; the second one drives the explorer.
const KEYWORD_INPUT_INDEX: usize = 1;

const STAGE: &str = "enrich";

#[derive(Debug, Clone, Copy)]
pub struct EnrichSettings {
    pub input_timeout: Duration,
    pub input_poll: Duration,
    pub settle: SettleTiming,
    pub max_results: usize,
}

impl From<&EnrichmentConfig> for EnrichSettings {
    fn from(config: &EnrichmentConfig) -> Self {
        let poll = Duration::from_millis(config.settle_poll_millis);
        Self {
            input_timeout: Duration::from_secs(config.input_timeout_secs),
            input_poll: poll,
            settle: SettleTiming {
                timeout: Duration::from_secs(config.settle_timeout_secs),
                poll_interval: poll,
                fallback_delay: Duration::from_secs(config.fallback_delay_secs),
            },
            max_results: config.max_results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub path: PathBuf,
    pub rows: usize,
    pub queries: usize,
    pub no_result_slots: usize,
    pub settle_fallbacks: usize,
}

/// Query text for a slot: `"<Product Type> <keyword>"`, or just the keyword
/// when the row has no product type.
pub fn query_text(product_type: &str, keyword: &str) -> String {
    if product_type.is_empty() {
        keyword.to_string()
    } else {
        format!("{} {}", product_type, keyword)
    }
}

/// Header of the enriched table: source columns in order, then any result
/// columns the source does not already have.
pub fn enriched_header(source: &[String]) -> Vec<String> {
    let mut header = source.to_vec();
    for slot in KeywordSlot::ALL {
        let column = slot.result_column();
        if !header.iter().any(|h| h == column) {
            header.push(column.to_string());
        }
    }
    header
}

/// One browser page worked strictly sequentially, row by row.
///
/// Owns the page; it is closed when the run ends, whether it succeeded or
/// hit a fatal error.
pub struct EnrichmentSession<P: ResearchPage> {
    page: P,
    settings: EnrichSettings,
    last_snapshot: Vec<String>,
    rows_done: usize,
    queries: usize,
    no_result_slots: usize,
    settle_fallbacks: usize,
}

impl<P: ResearchPage> EnrichmentSession<P> {
    pub fn new(page: P, settings: EnrichSettings) -> Self {
        Self {
            page,
            settings,
            last_snapshot: Vec::new(),
            rows_done: 0,
            queries: 0,
            no_result_slots: 0,
            settle_fallbacks: 0,
        }
    }

    /// Gives the page up to `timeout` to render its search inputs. Not
    /// fatal; every query waits for the input again.
    pub async fn wait_for_initial_render(&self, timeout: Duration) {
        if self.input_ready(timeout).await.is_none() {
            warn!(timeout_secs = timeout.as_secs(), "Research page still rendering");
        }
    }

    async fn input_ready(&self, timeout: Duration) -> Option<()> {
        let page = &self.page;
        poll_until(timeout, self.settings.input_poll, move || async move {
            match page.count_elements(KEYWORD_INPUT).await {
                Ok(count) if count > KEYWORD_INPUT_INDEX => Some(()),
                _ => None,
            }
        })
        .await
    }

    /// Submits one query and returns the joined results or [`NO_RESULTS`].
    ///
    /// Only a search input that never appears is an error.
    pub async fn query(&mut self, text: &str) -> std::result::Result<String, EnrichError> {
        if self.input_ready(self.settings.input_timeout).await.is_none() {
            return Err(EnrichError::InputNotReady {
                selector: KEYWORD_INPUT.to_string(),
                timeout_secs: self.settings.input_timeout.as_secs(),
            });
        }

        let before = self
            .page
            .read_texts(RESULT_ANCHORS, self.settings.max_results)
            .await
            .unwrap_or_else(|_| self.last_snapshot.clone());

        self.page
            .clear_and_focus(KEYWORD_INPUT, KEYWORD_INPUT_INDEX)
            .await?;
        self.page.type_text(text).await?;
        self.page.press_enter().await?;
        self.queries += 1;

        let results = match settle(
            &self.page,
            RESULT_ANCHORS,
            self.settings.max_results,
            &before,
            self.settings.settle,
        )
        .await
        {
            Settled::Stable(results) => Some(results),
            Settled::Fallback(results) => {
                self.settle_fallbacks += 1;
                warn!(query = %text, "Results did not settle, using fixed delay");
                results
            }
        };

        match results {
            Some(results) if !results.is_empty() => {
                debug!(count = results.len(), "Read results");
                let joined = results.join(", ");
                self.last_snapshot = results;
                Ok(joined)
            }
            other => {
                if let Some(results) = other {
                    self.last_snapshot = results;
                }
                self.no_result_slots += 1;
                Ok(NO_RESULTS.to_string())
            }
        }
    }

    /// Fills the result column of every slot whose keyword is non-empty.
    pub async fn enrich_row(&mut self, row: &mut Record) -> std::result::Result<(), EnrichError> {
        let product_type = row.text(columns::PRODUCT_TYPE).to_string();
        for slot in KeywordSlot::ALL {
            let keyword = row.text(slot.keyword_column()).to_string();
            if keyword.is_empty() {
                continue;
            }
            let text = query_text(&product_type, &keyword);
            let result = self
                .query(&text)
                .instrument(info_span!("query", slot = %slot))
                .await?;
            row.set(slot.result_column(), result);
        }
        Ok(())
    }

    /// Enriches every row, writes `completed-KeywordResearch[N].csv`, and
    /// closes the page. A fatal error closes the page and writes nothing.
    pub async fn run(
        mut self,
        table: Table,
        storage: &OutputStorage,
        progress: &dyn ProgressReporter,
    ) -> Result<EnrichmentReport> {
        progress.report(ProgressEvent::StageStarted {
            stage: STAGE,
            total: Some(table.rows.len()),
        });

        let outcome = self.enrich_table(table, storage, progress).await;
        if let Err(e) = self.page.close().await {
            warn!(error = %e, "Failed to close browser");
        }
        let path = outcome?;

        let report = EnrichmentReport {
            path,
            rows: self.rows_done,
            queries: self.queries,
            no_result_slots: self.no_result_slots,
            settle_fallbacks: self.settle_fallbacks,
        };
        info!(
            path = %report.path.display(),
            rows = report.rows,
            queries = report.queries,
            no_result_slots = report.no_result_slots,
            settle_fallbacks = report.settle_fallbacks,
            "Enrichment written"
        );
        progress.report(ProgressEvent::StageFinished {
            stage: STAGE,
            message: format!("{} rows, {} queries", report.rows, report.queries),
        });
        Ok(report)
    }

    async fn enrich_table(
        &mut self,
        table: Table,
        storage: &OutputStorage,
        progress: &dyn ProgressReporter,
    ) -> Result<PathBuf> {
        let header = enriched_header(&table.headers);
        let mut rows = table.rows;

        for (index, row) in rows.iter_mut().enumerate() {
            let done = index + 1;
            // Spreadsheet line, matching the reimport stages.
            let span = info_span!("row", row = index + 2, listing_id = %row.text(columns::PRODUCT_ID));
            self.enrich_row(row).instrument(span).await?;
            self.rows_done = done;
            progress.report(ProgressEvent::Advanced {
                stage: STAGE,
                done,
                status: "Processed".to_string(),
            });
        }

        write_table_numbered(storage, ENRICHED_BASE_NAME, &header, &rows)
    }
}
