//! Watcher for long-running operations.

use crate::config::PollConfig;
use crate::error::{CreativeFlowError, Result};
use std::future::Future;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A remote operation that finishes at some later poll.
pub(crate) trait LongRunning {
    /// Handle used to re-fetch the operation.
    fn name(&self) -> &str;

    /// True once no further polling is needed.
    fn is_done(&self) -> bool;
}

/// Re-fetches `operation` by name until it reports done.
///
/// An operation that is already done is returned without any fetch. Every
/// fetch uses the handle of the operation passed in, and the loop returns on
/// the first fetch that reports done.
pub(crate) async fn wait_until_done<O, F, Fut>(
    operation: O,
    policy: &PollConfig,
    cancel: &CancellationToken,
    mut fetch: F,
) -> Result<O>
where
    O: LongRunning,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<O>>,
{
    if operation.is_done() {
        return Ok(operation);
    }

    let handle = operation.name().to_string();
    // Durations too large to add to the clock mean "never".
    let deadline = policy.timeout.and_then(|t| Instant::now().checked_add(t));
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(CreativeFlowError::PollLimitExceeded { attempts });
            }
        }

        let wake = Instant::now().checked_add(policy.interval);
        match (wake, deadline) {
            (Some(wake), Some(deadline)) if wake <= deadline => sleep_until(wake, cancel).await?,
            (Some(wake), None) => sleep_until(wake, cancel).await?,
            (_, Some(deadline)) => {
                sleep_until(deadline, cancel).await?;
                return Err(CreativeFlowError::Timeout(policy.timeout.unwrap_or_default()));
            }
            (None, None) => {
                cancel.cancelled().await;
                return Err(CreativeFlowError::Cancelled);
            }
        }

        attempts += 1;
        let current = until_cancelled(cancel, fetch(handle.clone())).await?;
        if current.is_done() {
            tracing::debug!(operation = %handle, attempts, "operation finished");
            return Ok(current);
        }

        tracing::debug!(
            operation = %handle,
            attempts,
            elapsed_secs = started.elapsed().as_secs(),
            "operation still running"
        );
    }
}

/// Runs `fut` unless `cancel` fires first.
pub(crate) async fn until_cancelled<T, Fut>(cancel: &CancellationToken, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CreativeFlowError::Cancelled),
        out = fut => out,
    }
}

async fn sleep_until(when: Instant, cancel: &CancellationToken) -> Result<()> {
    until_cancelled(cancel, async {
        tokio::time::sleep_until(when).await;
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct FakeOp {
        name: String,
        done: bool,
    }

    impl LongRunning for FakeOp {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_done(&self) -> bool {
            self.done
        }
    }

    fn pending(name: &str) -> FakeOp {
        FakeOp {
            name: name.to_string(),
            done: false,
        }
    }

    fn policy() -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(5),
            max_attempts: None,
            timeout: None,
        }
    }

    /// Fetcher that reports done on the `done_on`-th call and records handles.
    fn scripted(
        done_on: usize,
        seen: Arc<Mutex<Vec<String>>>,
    ) -> impl FnMut(String) -> std::future::Ready<Result<FakeOp>> {
        move |name: String| {
            let mut seen = seen.lock().unwrap();
            seen.push(name.clone());
            // A fresh name on every response: the loop must keep using the original handle.
            let reply = FakeOp {
                name: format!("{}-copy{}", name, seen.len()),
                done: seen.len() >= done_on,
            };
            std::future::ready(Ok(reply))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_first_done_tick() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        let op = wait_until_done(
            pending("operations/abc"),
            &policy(),
            &CancellationToken::new(),
            scripted(3, seen.clone()),
        )
        .await
        .unwrap();

        assert!(op.done);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|n| n == "operations/abc"));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(15) && elapsed < Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_done_is_not_polled() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let done = FakeOp {
            name: "operations/done".into(),
            done: true,
        };

        let op = wait_until_done(done, &policy(), &CancellationToken::new(), scripted(1, seen.clone()))
            .await
            .unwrap();

        assert_eq!(op.name, "operations/done");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let policy = PollConfig {
            max_attempts: Some(4),
            ..policy()
        };

        let err = wait_until_done(
            pending("operations/slow"),
            &policy,
            &CancellationToken::new(),
            scripted(usize::MAX, seen.clone()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreativeFlowError::PollLimitExceeded { attempts: 4 }));
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let policy = PollConfig {
            timeout: Some(Duration::from_secs(12)),
            ..policy()
        };
        let start = Instant::now();

        let err = wait_until_done(
            pending("operations/slow"),
            &policy,
            &CancellationToken::new(),
            scripted(usize::MAX, seen.clone()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreativeFlowError::Timeout(d) if d == Duration::from_secs(12)));
        // Polls at 5s and 10s; the 15s tick would overshoot the deadline.
        assert_eq!(seen.lock().unwrap().len(), 2);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(12) && elapsed < Duration::from_secs(13));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_first_poll() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = wait_until_done(pending("operations/x"), &policy(), &cancel, scripted(1, seen.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, CreativeFlowError::Cancelled));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_mid_wait() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let err = wait_until_done(
            pending("operations/x"),
            &policy(),
            &cancel,
            scripted(usize::MAX, seen.clone()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreativeFlowError::Cancelled));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_propagates() {
        let err = wait_until_done(
            pending("operations/x"),
            &policy(),
            &CancellationToken::new(),
            |_name: String| async { Err::<FakeOp, _>(CreativeFlowError::InvalidCredential("gone".into())) },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreativeFlowError::InvalidCredential(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_hung_fetch() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });
        let start = Instant::now();

        let err = wait_until_done(pending("operations/x"), &policy(), &cancel, |_name: String| {
            std::future::pending::<Result<FakeOp>>()
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CreativeFlowError::Cancelled));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(7) && elapsed < Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_timeout_means_no_deadline() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let policy = PollConfig {
            timeout: Some(Duration::MAX),
            ..policy()
        };

        let op = wait_until_done(
            pending("operations/x"),
            &policy,
            &CancellationToken::new(),
            scripted(2, seen.clone()),
        )
        .await
        .unwrap();

        assert!(op.done);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_interval_waits_for_deadline() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let policy = PollConfig {
            interval: Duration::MAX,
            timeout: Some(Duration::from_secs(12)),
            ..policy()
        };
        let start = Instant::now();

        let err = wait_until_done(
            pending("operations/x"),
            &policy,
            &CancellationToken::new(),
            scripted(1, seen.clone()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CreativeFlowError::Timeout(_)));
        assert!(seen.lock().unwrap().is_empty());
        assert!(start.elapsed() < Duration::from_secs(13));
    }
}
