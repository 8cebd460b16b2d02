use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use listkit::{Config, ImageStageOutcome, ImageUploadStage};

use super::{connect, report_exit, CommandResponse, Output};
use crate::progress::LogProgress;

pub async fn run(config: &Config, input: &Path, output: &Output) -> Result<ExitCode> {
    let (session, client) = connect(config)?;

    let stage = ImageUploadStage::new(&client, &session.shop_id, config.paths.image_root_dir())
        .with_config(&config.images, config.catalog.video_retries);
    let outcome = stage
        .run_file(input, &LogProgress)
        .await
        .context("Image upload failed")?;

    match outcome {
        ImageStageOutcome::Blocked(errors) => {
            let mut human = format!(
                "Nothing uploaded: {} rows point at missing folders",
                errors.len()
            );
            let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            for line in &lines {
                human.push_str(&format!("\n  {}", line));
            }
            output.emit(
                &CommandResponse::err(&lines, "folder validation failed"),
                &human,
            )?;
            Ok(ExitCode::FAILURE)
        }
        ImageStageOutcome::Completed(report) => {
            let mut human = format!("Images: {}", report.summary());
            for error in report.row_errors() {
                human.push_str(&format!("\n  {}", error));
            }
            output.emit(&CommandResponse::ok(&report), &human)?;
            Ok(report_exit(&report))
        }
    }
}
