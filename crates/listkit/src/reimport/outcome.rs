use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of processing one table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason")]
pub enum RowOutcome {
    Success,
    Skipped(String),
    Failed(String),
}

impl RowOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RowOutcome::Success => "Success",
            RowOutcome::Skipped(_) => "Skipped",
            RowOutcome::Failed(_) => "Failed",
        }
    }
}

/// A failed row, identified by its spreadsheet line (header is line 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowResult {
    pub row: usize,
    pub listing_id: String,
    pub outcome: RowOutcome,
}

/// Per-row outcomes of one mutation stage run, in table order.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rows: Vec<RowResult>,
}

impl StageReport {
    pub fn start(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            rows: Vec::new(),
        }
    }

    pub fn record(&mut self, row: usize, listing_id: &str, outcome: RowOutcome) {
        self.rows.push(RowResult {
            row,
            listing_id: listing_id.to_string(),
            outcome,
        });
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.rows.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Success))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Failed(_)))
    }

    /// Errors derived from `Failed` rows.
    pub fn row_errors(&self) -> Vec<RowError> {
        self.rows
            .iter()
            .filter_map(|r| match &r.outcome {
                RowOutcome::Failed(message) => Some(RowError::new(r.row, message.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} skipped, {} failed",
            self.succeeded(),
            self.skipped(),
            self.failed()
        )
    }
}
