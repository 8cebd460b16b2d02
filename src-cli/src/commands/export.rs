use std::process::ExitCode;

use anyhow::{Context, Result};

use listkit::{Config, ExportStage, OutputStorage};

use super::{connect, CommandResponse, Output};
use crate::progress::LogProgress;

pub async fn run(config: &Config, output: &Output) -> Result<ExitCode> {
    let (session, client) = connect(config)?;
    let storage = OutputStorage::new(config.paths.export_dir());

    let report = ExportStage::new(&client, storage, config.catalog.page_size)
        .run(&session.shop_id, &LogProgress)
        .await
        .context("Export failed")?;

    let human = format!(
        "Wrote {} listings to {} ({} pages, {} failed)",
        report.rows_written,
        report.path.display(),
        report.pages_fetched,
        report.pages_failed
    );
    output.emit(&CommandResponse::ok(&report), &human)?;
    Ok(ExitCode::SUCCESS)
}
