use std::future::Future;

use tracing::{error, info, warn};

use super::error::CatalogError;
use super::types::SubmitOutcome;

/// Runs `attempt` until it succeeds or `retries` extra attempts are spent.
///
/// Total attempts are `1 + retries`. Every failure is logged; the last one
/// ends with [`SubmitOutcome::Failed`] instead of an error.
pub async fn submit_with_retries<F, Fut>(label: &str, retries: u32, mut attempt: F) -> SubmitOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(), CatalogError>>,
{
    let mut attempt_number = 1;
    loop {
        match attempt(attempt_number).await {
            Ok(()) => {
                info!(label, attempt = attempt_number, "Submission succeeded");
                return SubmitOutcome::Success;
            }
            Err(e) => {
                let remaining = retries.saturating_sub(attempt_number - 1);
                if remaining == 0 {
                    error!(label, attempt = attempt_number, error = %e, "Submission failed, no retries left");
                    return SubmitOutcome::Failed;
                }
                warn!(label, attempt = attempt_number, remaining, error = %e, "Submission failed, retrying");
                attempt_number += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn rejected() -> CatalogError {
        CatalogError::RemoteApi {
            status: 500,
            body: "boom".to_string(),
        }
    }

    #[tokio::test]
    async fn test_always_failing_makes_one_plus_retries_attempts() {
        let calls = AtomicU32::new(0);
        let outcome = submit_with_retries("video", 2, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(rejected()) }
        })
        .await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_is_single_attempt() {
        let calls = AtomicU32::new(0);
        let outcome = submit_with_retries("video", 0, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(rejected()) }
        })
        .await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = AtomicU32::new(0);
        let outcome = submit_with_retries("video", 5, |n| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(rejected())
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(outcome, SubmitOutcome::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
