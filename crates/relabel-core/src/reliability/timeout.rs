//! Deadline guard
//!
//! Races a future against a deadline. The first side to settle decides the
//! outcome; the losing future is dropped and its result, if any, is never
//! observed by the caller. Cancellation is cooperative only: work already
//! handed to an external callee, such as an in-flight normalization call,
//! is not forcibly halted and may still land downstream.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Deadline elapsed before the guarded future settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {limit:?} exceeded")]
pub struct DeadlineExceeded {
    /// The deadline that was exceeded
    pub limit: Duration,
}

/// Run `future` under `deadline`.
pub async fn with_deadline<T>(
    deadline: Duration,
    future: impl Future<Output = T>,
) -> Result<T, DeadlineExceeded> {
    match tokio::time::timeout(deadline, future).await {
        Ok(value) => Ok(value),
        Err(_) => Err(DeadlineExceeded { limit: deadline }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test(start_paused = true)]
    async fn test_fast_future_wins() {
        let result = with_deadline(Duration::from_millis(50), async { 7 }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wins_over_slow_future() {
        let start = tokio::time::Instant::now();

        let result = with_deadline(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            7
        })
        .await;

        assert_eq!(result.unwrap_err(), DeadlineExceeded { limit: Duration::from_millis(5) });
        assert_eq!(start.elapsed(), Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_late_result_surfaces() {
        let (tx, rx) = oneshot::channel();

        let result = with_deadline(Duration::from_millis(5), async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(7);
            7
        })
        .await;

        assert!(result.is_err());

        // The losing side was dropped before producing anything
        assert!(rx.await.is_err());
    }
}
