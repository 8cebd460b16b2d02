use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use super::page::ResearchPage;

/// Calls `check` every `interval` until it yields `Some` or `timeout` passes.
/// The first check runs immediately.
pub async fn poll_until<T, F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = check().await {
            return Some(value);
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(interval).await;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SettleTiming {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub fallback_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// Non-empty results that changed from the snapshot and held still for
    /// two polls.
    Stable(Vec<String>),
    /// The table never settled; this is what was there after the fixed
    /// delay (`None` when even that read failed).
    Fallback(Option<Vec<String>>),
}

/// Waits for the result table to replace `before` with new, stable content.
///
/// Never returns `before` or an empty table as a `Stable` result; the page
/// blanks the table while a query loads. When the deadline passes it sleeps
/// `fallback_delay` once and reports whatever is on the page.
pub async fn settle(
    page: &dyn ResearchPage,
    selector: &str,
    limit: usize,
    before: &[String],
    timing: SettleTiming,
) -> Settled {
    let deadline = Instant::now() + timing.timeout;
    let mut previous: Option<Vec<String>> = None;

    loop {
        sleep(timing.poll_interval).await;
        let current = page.read_texts(selector, limit).await.ok();
        debug!(results = current.as_ref().map(Vec::len), "Polled result table");

        if let (Some(now), Some(last)) = (&current, &previous) {
            if !now.is_empty() && now.as_slice() != before && now == last {
                return Settled::Stable(now.clone());
            }
        }
        previous = current;

        if Instant::now() >= deadline {
            break;
        }
    }

    sleep(timing.fallback_delay).await;
    Settled::Fallback(page.read_texts(selector, limit).await.ok())
}
