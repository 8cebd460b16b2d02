use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use listkit::{run_enrichment, Config};

use super::{CommandResponse, Output};
use crate::progress::LogProgress;

pub async fn run(config: &Config, input: &Path, output: &Output) -> Result<ExitCode> {
    let report = run_enrichment(input, &config.enrichment, &config.paths, &LogProgress)
        .await
        .context("Keyword research failed")?;

    let mut human = format!(
        "Enriched {} rows with {} queries into {}",
        report.rows,
        report.queries,
        report.path.display()
    );
    if report.settle_fallbacks > 0 {
        human.push_str(&format!(
            "\n{} queries used the fallback delay; check those cells",
            report.settle_fallbacks
        ));
    }
    output.emit(&CommandResponse::ok(&report), &human)?;
    Ok(ExitCode::SUCCESS)
}
