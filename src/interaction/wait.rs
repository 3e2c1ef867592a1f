use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::HarnessError;

/// Poll `condition` until it holds or `timeout` elapses.
///
/// Returns the time spent waiting. A driver error during a poll counts as
/// "not yet" (the page may be mid-navigation); only the deadline fails the
/// wait, with [`HarnessError::Timeout`] naming `description`.
pub async fn wait_until<F, Fut>(
    description: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut condition: F,
) -> Result<Duration, HarnessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let start = Instant::now();
    loop {
        match condition().await {
            Ok(true) => return Ok(start.elapsed()),
            Ok(false) => {}
            Err(err) => tracing::debug!("Condition '{}' not evaluable yet: {:#}", description, err),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(HarnessError::Timeout {
                condition: description.to_string(),
                elapsed,
            });
        }
        tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_returns_once_condition_holds() {
        let polls = AtomicUsize::new(0);
        let polls = &polls;
        let waited = wait_until("third poll", Duration::from_secs(2), Duration::from_millis(5), move || async move {
            Ok::<_, anyhow::Error>(polls.fetch_add(1, Ordering::SeqCst) >= 2)
        })
        .await
        .unwrap();
        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert!(waited < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_times_out_with_description() {
        let err = wait_until("never", Duration::from_millis(50), Duration::from_millis(10), || async {
            Ok::<_, anyhow::Error>(false)
        })
        .await
        .unwrap_err();
        match err {
            HarnessError::Timeout { condition, elapsed } => {
                assert_eq!(condition, "never");
                assert!(elapsed >= Duration::from_millis(50));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_driver_errors_are_retried_until_deadline() {
        let err = wait_until("flaky", Duration::from_millis(30), Duration::from_millis(5), || async {
            Err::<bool, _>(anyhow::anyhow!("Execution context was destroyed"))
        })
        .await
        .unwrap_err();
        assert!(err.is_timeout());
    }
}
