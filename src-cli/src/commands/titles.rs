use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use listkit::{Config, TitleTagStage};

use super::{connect, report_exit, CommandResponse, Output};
use crate::progress::LogProgress;

pub async fn run(config: &Config, input: &Path, output: &Output) -> Result<ExitCode> {
    let (session, client) = connect(config)?;

    let report = TitleTagStage::new(&client, &session.shop_id)
        .run_file(input, &LogProgress)
        .await
        .context("Title update failed")?;

    let mut human = format!("Titles and tags: {}", report.summary());
    for error in report.row_errors() {
        human.push_str(&format!("\n  {}", error));
    }
    output.emit(&CommandResponse::ok(&report), &human)?;
    Ok(report_exit(&report))
}
