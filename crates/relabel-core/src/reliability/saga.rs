//! Do/compensate execution
//!
//! Runs a primary action; on failure runs a compensating action exactly
//! once. The primary failure is preserved in every failure shape. A failed
//! compensation is the highest-severity outcome this module reports and is
//! never swallowed.

use std::future::Future;

use tracing::{error, warn};

/// Result of a do/compensate run
///
/// Exactly one of `result` and `error` is populated. `compensation_error`
/// is populated only when the primary action failed and the compensating
/// action then failed as well.
#[derive(Debug)]
pub struct SagaOutcome<T, E> {
    /// Whether the primary action succeeded
    pub success: bool,

    /// Whether compensation ran and succeeded
    pub compensated: bool,

    /// Primary result on success
    pub result: Option<T>,

    /// Primary failure, preserved even when compensation succeeds
    pub error: Option<E>,

    /// Compensation failure description
    pub compensation_error: Option<String>,
}

/// Execute `do_work`; on failure execute `compensate`.
///
/// Compensation runs at most once and is never retried.
pub async fn run_saga<T, E, DoFut, CompFut>(do_work: DoFut, compensate: CompFut) -> SagaOutcome<T, E>
where
    E: std::fmt::Display,
    DoFut: Future<Output = Result<T, E>>,
    CompFut: Future<Output = anyhow::Result<()>>,
{
    match do_work.await {
        Ok(result) => SagaOutcome {
            success: true,
            compensated: false,
            result: Some(result),
            error: None,
            compensation_error: None,
        },
        Err(err) => match compensate.await {
            Ok(()) => {
                warn!(error = %err, "primary action failed, compensation applied");
                SagaOutcome {
                    success: false,
                    compensated: true,
                    result: None,
                    error: Some(err),
                    compensation_error: None,
                }
            }
            Err(comp_err) => {
                error!(
                    error = %err,
                    compensation_error = %comp_err,
                    "compensation failed after primary failure"
                );
                SagaOutcome {
                    success: false,
                    compensated: false,
                    result: None,
                    error: Some(err),
                    compensation_error: Some(comp_err.to_string()),
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_skips_compensation() {
        let compensations = AtomicU32::new(0);

        let outcome: SagaOutcome<u32, String> = run_saga(async { Ok(5) }, async {
            compensations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(outcome.success);
        assert!(!outcome.compensated);
        assert_eq!(outcome.result, Some(5));
        assert!(outcome.error.is_none());
        assert_eq!(compensations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_triggers_compensation() {
        let compensations = AtomicU32::new(0);

        let outcome: SagaOutcome<u32, String> =
            run_saga(async { Err("write rejected".to_string()) }, async {
                compensations.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(!outcome.success);
        assert!(outcome.compensated);
        assert_eq!(outcome.error.as_deref(), Some("write rejected"));
        assert!(outcome.compensation_error.is_none());
        assert_eq!(compensations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_compensation_is_surfaced() {
        let outcome: SagaOutcome<u32, String> = run_saga(
            async { Err("write rejected".to_string()) },
            async { Err(anyhow!("undo also failed")) },
        )
        .await;

        assert!(!outcome.success);
        assert!(!outcome.compensated);
        // The primary failure is preserved alongside the compensation failure
        assert_eq!(outcome.error.as_deref(), Some("write rejected"));
        assert_eq!(outcome.compensation_error.as_deref(), Some("undo also failed"));
    }
}
