//! Catalog export: every active listing becomes one template row.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use crate::catalog::{list_active_listings, CatalogApi, ListingRecord};
use crate::error::Result;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::storage::OutputStorage;
use crate::table::{columns, write_table_numbered, TemplateRow};

/// Base file name of the exported template table.
pub const EXPORT_BASE_NAME: &str = "template_listingsData";

const STAGE: &str = "export";

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows_written: usize,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub duplicates_skipped: u32,
}

/// Maps a listing onto the template layout. Unknown sections give an empty
/// category; tags past the template's 13 columns are dropped.
pub fn build_template_row(listing: &ListingRecord, categories: &HashMap<u64, String>) -> TemplateRow {
    if listing.tags.len() > columns::MAX_TAGS {
        warn!(
            listing_id = listing.listing_id,
            tags = listing.tags.len(),
            "Listing has more tags than template columns, extra tags dropped"
        );
    }

    let category = listing
        .shop_section_id
        .and_then(|id| categories.get(&id))
        .cloned()
        .unwrap_or_default();

    TemplateRow {
        listing_id: listing.listing_id.to_string(),
        title: listing.title.clone(),
        tags: listing.tags.iter().take(columns::MAX_TAGS).cloned().collect(),
        category,
        ..TemplateRow::default()
    }
}

pub struct ExportStage<'a> {
    api: &'a dyn CatalogApi,
    storage: OutputStorage,
    page_size: u32,
}

impl<'a> ExportStage<'a> {
    pub fn new(api: &'a dyn CatalogApi, storage: OutputStorage, page_size: u32) -> Self {
        Self {
            api,
            storage,
            page_size,
        }
    }

    /// Pages through the shop's active listings and writes them to the next
    /// free `template_listingsData[N].csv`.
    pub async fn run(&self, shop_id: &str, progress: &dyn ProgressReporter) -> Result<ExportReport> {
        let span = info_span!("export", shop_id = %shop_id);
        self.run_inner(shop_id, progress).instrument(span).await
    }

    async fn run_inner(&self, shop_id: &str, progress: &dyn ProgressReporter) -> Result<ExportReport> {
        progress.report(ProgressEvent::StageStarted {
            stage: STAGE,
            total: None,
        });

        let categories = match self.api.list_categories(shop_id).await {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Failed to fetch shop sections, categories left empty");
                HashMap::new()
            }
        };

        let mut pager = list_active_listings(self.api, shop_id, self.page_size);
        let mut rows = Vec::new();
        while let Some(batch) = pager.next_batch().await? {
            rows.extend(
                batch
                    .iter()
                    .map(|listing| build_template_row(listing, &categories).to_record()),
            );
            progress.report(ProgressEvent::Advanced {
                stage: STAGE,
                done: rows.len(),
                status: format!("{} listings", batch.len()),
            });
        }
        let stats = pager.stats();

        let path = write_table_numbered(
            &self.storage,
            EXPORT_BASE_NAME,
            &columns::template_header(),
            &rows,
        )?;

        info!(
            path = %path.display(),
            rows = rows.len(),
            pages_fetched = stats.pages_fetched,
            pages_failed = stats.pages_failed,
            "Export written"
        );
        progress.report(ProgressEvent::StageFinished {
            stage: STAGE,
            message: format!("{} rows written", rows.len()),
        });

        Ok(ExportReport {
            path,
            rows_written: rows.len(),
            pages_fetched: stats.pages_fetched,
            pages_failed: stats.pages_failed,
            duplicates_skipped: stats.duplicates_skipped,
        })
    }
}
