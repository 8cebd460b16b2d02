//! Subcommand handlers.
//!
//! Commands are organized by stage:
//! - `export`: Catalog to template CSV
//! - `enrich`: Keyword research columns
//! - `titles`: Title and tag reimport
//! - `images`: Ranked image and video reimport

pub mod enrich;
pub mod export;
pub mod images;
pub mod titles;

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;

use listkit::{CatalogClient, Config, RunSession, StageReport};

/// Exit status when a stage finished but some rows failed.
const PARTIAL_FAILURE: u8 = 2;

/// Response wrapper for `--json` output.
#[derive(Debug, Serialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> CommandResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

/// How results reach stdout.
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Prints `response` as JSON, or `human` otherwise.
    pub fn emit<T: Serialize>(&self, response: &CommandResponse<T>, human: &str) -> Result<()> {
        if self.json {
            let rendered =
                serde_json::to_string_pretty(response).context("Failed to render report")?;
            println!("{}", rendered);
        } else {
            println!("{}", human);
        }
        Ok(())
    }
}

/// Resolves credentials and builds the catalog client for stages that
/// talk to the shop.
pub fn connect(config: &Config) -> Result<(RunSession, CatalogClient)> {
    let session =
        RunSession::from_config(&config.credentials).context("Failed to resolve credentials")?;
    let client = CatalogClient::new(&config.catalog, &session)
        .context("Failed to build catalog client")?;
    tracing::info!(
        run_id = %session.run_id,
        shop_id = %session.shop_id,
        user = session.user_name.as_deref().unwrap_or("-"),
        user_id = session.user_id().as_deref().unwrap_or("-"),
        "Catalog session ready"
    );
    Ok((session, client))
}

pub fn report_exit(report: &StageReport) -> ExitCode {
    if report.failed() > 0 {
        ExitCode::from(PARTIAL_FAILURE)
    } else {
        ExitCode::SUCCESS
    }
}
