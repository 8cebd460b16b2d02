use std::path::Path;

use tracing::{info, info_span, warn, Instrument};

use crate::catalog::{CatalogApi, ListingUpdate};
use crate::error::Result;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::table::{load_table, Table, TableSchema, TemplateRow};

use super::outcome::{RowOutcome, StageReport};

const STAGE: &str = "update-titles";

/// Pushes each row's `Product Title` and non-empty `Tag N` values back to
/// its listing. Rows are independent; a failed patch never stops the run.
pub struct TitleTagStage<'a> {
    api: &'a dyn CatalogApi,
    shop_id: String,
}

impl<'a> TitleTagStage<'a> {
    pub fn new(api: &'a dyn CatalogApi, shop_id: &str) -> Self {
        Self {
            api,
            shop_id: shop_id.to_string(),
        }
    }

    pub async fn run_file(&self, path: &Path, progress: &dyn ProgressReporter) -> Result<StageReport> {
        let table = load_table(path, &TableSchema::title_tags())?;
        Ok(self.run(&table, progress).await)
    }

    pub async fn run(&self, table: &Table, progress: &dyn ProgressReporter) -> StageReport {
        let mut report = StageReport::start(STAGE);
        progress.report(ProgressEvent::StageStarted {
            stage: STAGE,
            total: Some(table.rows.len()),
        });

        for (done, (line, record)) in (1..).zip(table.numbered_rows()) {
            let row = TemplateRow::from_record(record);
            let span = info_span!("row", row = line, listing_id = %row.listing_id);
            let outcome = self.update_row(&row).instrument(span).await;

            progress.report(ProgressEvent::Advanced {
                stage: STAGE,
                done,
                status: outcome.label().to_string(),
            });
            report.record(line, &row.listing_id, outcome);
        }

        let report = report.finish();
        info!(summary = %report.summary(), "Title and tag update finished");
        progress.report(ProgressEvent::StageFinished {
            stage: STAGE,
            message: report.summary(),
        });
        report
    }

    async fn update_row(&self, row: &TemplateRow) -> RowOutcome {
        if row.listing_id.is_empty() {
            warn!("Row has no Product ID, skipping");
            return RowOutcome::Skipped("empty Product ID".to_string());
        }

        let update = ListingUpdate::new(row.title.clone(), row.present_tags());
        match self
            .api
            .patch_listing(&self.shop_id, &row.listing_id, &update)
            .await
        {
            Ok(()) => {
                info!("Updated listing");
                RowOutcome::Success
            }
            Err(e) => {
                warn!(error = %e, "Failed to update listing");
                RowOutcome::Failed(e.to_string())
            }
        }
    }
}
