use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::client::{AthenaError, QueryService};
use crate::state::{QueryState, QueryStatus};

/// How often to check an execution and how long to wait in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` waits until the service reports a terminal state.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Poll `query_id` on a fixed interval until it reaches a terminal state.
///
/// Returns the final status on SUCCEEDED. FAILED and CANCELLED map to
/// [`AthenaError::QueryFailed`] and [`AthenaError::QueryCancelled`]. When the
/// policy's timeout elapses first the execution is cancelled (best-effort) and
/// [`AthenaError::QueryTimeout`] is returned.
pub async fn wait_for_completion(
    service: &dyn QueryService,
    query_id: &str,
    policy: &PollPolicy,
) -> Result<QueryStatus, AthenaError> {
    let start = Instant::now();
    let mut polls: u32 = 0;

    loop {
        let status = service.status(query_id).await?;
        polls += 1;

        debug!(
            query_id = %query_id,
            state = %status.state,
            polls,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Polling query status"
        );

        match status.state {
            QueryState::Succeeded => {
                info!(
                    query_id = %query_id,
                    bytes_scanned = status.bytes_scanned,
                    execution_time_ms = status.execution_time_ms,
                    polls,
                    "Query succeeded"
                );
                return Ok(status);
            }

            QueryState::Failed => {
                let reason = status.reason.unwrap_or_else(|| "unknown".to_string());
                error!(query_id = %query_id, reason = %reason, "Query failed");
                return Err(AthenaError::QueryFailed {
                    query_id: query_id.to_string(),
                    reason,
                });
            }

            QueryState::Cancelled => {
                warn!(query_id = %query_id, "Query was cancelled");
                return Err(AthenaError::QueryCancelled {
                    query_id: query_id.to_string(),
                });
            }

            QueryState::Queued | QueryState::Running => {}
        }

        if let Some(timeout) = policy.timeout {
            if start.elapsed() >= timeout {
                warn!(
                    query_id = %query_id,
                    timeout_seconds = timeout.as_secs(),
                    "Query timed out, cancelling"
                );
                // The timeout is what gets reported; a failed cancel only logs.
                if let Err(e) = service.cancel(query_id).await {
                    warn!(query_id = %query_id, error = %e, "Cancel after timeout failed");
                }
                return Err(AthenaError::QueryTimeout {
                    query_id: query_id.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
        }

        tokio::time::sleep(policy.interval).await;
    }
}
