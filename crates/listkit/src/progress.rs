/// Events emitted by the stages while they work through a table or catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    StageStarted {
        stage: &'static str,
        /// Units of work when known up front (table rows); `None` for paging.
        total: Option<usize>,
    },
    /// One unit finished. `status` is a short label such as `Success`.
    Advanced {
        stage: &'static str,
        done: usize,
        status: String,
    },
    StageFinished {
        stage: &'static str,
        message: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}
