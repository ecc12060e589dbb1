use std::fmt;

use aws_sdk_athena::types::QueryExecutionState;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a single query execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryState {
    /// No further transition happens after a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueryState::Succeeded | QueryState::Failed | QueryState::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryState::Queued => "QUEUED",
            QueryState::Running => "RUNNING",
            QueryState::Succeeded => "SUCCEEDED",
            QueryState::Failed => "FAILED",
            QueryState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&QueryExecutionState> for QueryState {
    fn from(state: &QueryExecutionState) -> Self {
        match state {
            QueryExecutionState::Queued => QueryState::Queued,
            QueryExecutionState::Running => QueryState::Running,
            QueryExecutionState::Succeeded => QueryState::Succeeded,
            QueryExecutionState::Failed => QueryState::Failed,
            QueryExecutionState::Cancelled => QueryState::Cancelled,
            // Future SDK variants are treated as still in flight; the poll
            // timeout bounds the wait.
            _ => QueryState::Running,
        }
    }
}

/// One status observation for a query execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStatus {
    pub state: QueryState,
    /// Athena's `StateChangeReason`, usually only set on failure.
    pub reason: Option<String>,
    /// Total bytes scanned so far.
    pub bytes_scanned: u64,
    /// Engine execution time in milliseconds.
    pub execution_time_ms: u64,
}

impl QueryStatus {
    /// A status carrying only a state, as test doubles and early polls report.
    pub fn new(state: QueryState) -> Self {
        Self {
            state,
            reason: None,
            bytes_scanned: 0,
            execution_time_ms: 0,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
