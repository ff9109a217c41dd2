use std::future::Future;
use std::time::Duration;

use chartsync_core_types::{ElementHandle, Query};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::ports::QueryPort;

/// Fixed-interval polling bounded by a deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSpec {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSpec {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Runs `probe` every `spec.interval` until it yields a value or `spec.timeout` elapses.
pub async fn poll_until<T, F, Fut>(spec: PollSpec, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();
    while started.elapsed() < spec.timeout {
        if let Some(found) = probe().await {
            return Some(found);
        }
        sleep(spec.interval).await;
    }
    None
}

/// A container counts as ready once it exists and has at least one child.
pub async fn populated(query: &dyn QueryPort, element: &ElementHandle) -> bool {
    match query.child_count(element).await {
        Ok(count) => count > 0,
        Err(err) => {
            debug!(%element, %err, "child count unavailable");
            false
        }
    }
}

/// Polls for the dropdown container with `dropdown_id` to appear populated.
pub async fn wait_for_dropdown(
    query: &dyn QueryPort,
    dropdown_id: &str,
    spec: PollSpec,
) -> Option<ElementHandle> {
    let lookup = &Query::id(dropdown_id);
    let found = poll_until(spec, move || async move {
        let handle = match query.query_one(None, lookup).await {
            Ok(Some(handle)) => handle,
            Ok(None) => return None,
            Err(err) => {
                debug!(dropdown_id, %err, "dropdown lookup failed");
                return None;
            }
        };
        populated(query, &handle).await.then_some(handle)
    })
    .await;
    if found.is_none() {
        debug!(
            dropdown_id,
            timeout_ms = u64::try_from(spec.timeout.as_millis()).unwrap_or(u64::MAX),
            "dropdown wait timed out"
        );
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn poll_returns_first_hit() {
        let calls = &AtomicUsize::new(0);
        let spec = PollSpec::new(Duration::from_millis(500), Duration::from_millis(50));
        let started = Instant::now();
        let hit = poll_until(spec, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            (n == 3).then_some(n)
        })
        .await;
        assert_eq!(hit, Some(3));
        assert_eq!(started.elapsed(), Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_gives_up_at_deadline() {
        let calls = &AtomicUsize::new(0);
        let spec = PollSpec::new(Duration::from_millis(500), Duration::from_millis(50));
        let started = Instant::now();
        let hit: Option<()> = poll_until(spec, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;
        assert!(hit.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_never_probes() {
        let calls = &AtomicUsize::new(0);
        let spec = PollSpec::new(Duration::ZERO, Duration::from_millis(50));
        let hit: Option<()> = poll_until(spec, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;
        assert!(hit.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
