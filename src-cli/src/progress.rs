use listkit::{ProgressEvent, ProgressReporter};
use tracing::info;

/// Turns stage progress into log lines on stderr.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { stage, total } => match total {
                Some(total) => info!(stage, total, "Stage started"),
                None => info!(stage, "Stage started"),
            },
            ProgressEvent::Advanced { stage, done, status } => {
                info!(stage, done, status = %status, "Progress")
            }
            ProgressEvent::StageFinished { stage, message } => {
                info!(stage, "{}", message)
            }
        }
    }
}
