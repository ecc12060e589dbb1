//! AWS Athena query execution client.
//!
//! [`QueryService`] is the seam the report pipeline talks to; [`AthenaClient`]
//! implements it on top of the AWS SDK. Waiting for completion lives in
//! [`crate::poller`], not here, so the client stays a thin request mapper.

use async_trait::async_trait;
use aws_sdk_athena::types::{QueryExecutionContext, ResultConfiguration};
use tracing::{debug, info};

use crate::query::QueryRequest;
use crate::state::{QueryState, QueryStatus};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors that can occur during Athena operations.
#[derive(Debug, thiserror::Error)]
pub enum AthenaError {
    /// The query execution ended in FAILED.
    #[error("Query {query_id} ended in state FAILED: {reason}")]
    QueryFailed { query_id: String, reason: String },

    /// The query was cancelled (either by the user or by Athena).
    #[error("Query {query_id} ended in state CANCELLED")]
    QueryCancelled { query_id: String },

    /// No terminal state was reached within the configured bound.
    #[error("Query {query_id} timed out after {seconds}s")]
    QueryTimeout { query_id: String, seconds: u64 },

    /// An AWS SDK error (stringified).
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl AthenaError {
    /// The terminal state that caused the abort, if any.
    pub fn terminal_state(&self) -> Option<QueryState> {
        match self {
            AthenaError::QueryFailed { .. } => Some(QueryState::Failed),
            AthenaError::QueryCancelled { .. } => Some(QueryState::Cancelled),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// Managed query service operations the pipeline depends on.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Start an execution and return its opaque identifier.
    async fn submit(&self, request: &QueryRequest) -> Result<String, AthenaError>;

    /// Current state of an execution.
    async fn status(&self, query_id: &str) -> Result<QueryStatus, AthenaError>;

    /// Ask the service to stop a running execution.
    async fn cancel(&self, query_id: &str) -> Result<(), AthenaError>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`QueryService`] backed by the AWS SDK Athena client.
#[derive(Clone)]
pub struct AthenaClient {
    athena_client: aws_sdk_athena::Client,
}

impl AthenaClient {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        info!(
            region = ?sdk_config.region().map(|r| r.as_ref()),
            "AthenaClient initialised"
        );
        Self {
            athena_client: aws_sdk_athena::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl QueryService for AthenaClient {
    async fn submit(&self, request: &QueryRequest) -> Result<String, AthenaError> {
        debug!(sql = %request.sql, "Starting Athena query");

        let mut ctx = QueryExecutionContext::builder();
        if !request.database.is_empty() {
            ctx = ctx.database(&request.database);
        }

        let start_resp = self
            .athena_client
            .start_query_execution()
            .query_string(&request.sql)
            .query_execution_context(ctx.build())
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(&request.output_location)
                    .build(),
            )
            .work_group(&request.workgroup)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        let query_id = start_resp
            .query_execution_id()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution ID returned".into()))?
            .to_string();

        info!(
            query_id = %query_id,
            database = %request.database,
            output_location = %request.output_location,
            "Query execution started"
        );
        Ok(query_id)
    }

    async fn status(&self, query_id: &str) -> Result<QueryStatus, AthenaError> {
        let resp = self
            .athena_client
            .get_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        let qe = resp
            .query_execution()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution in response".into()))?;

        let status = qe.status();
        let stats = qe.statistics();

        Ok(QueryStatus {
            state: status
                .and_then(|s| s.state())
                .map(QueryState::from)
                .unwrap_or(QueryState::Queued),
            reason: status
                .and_then(|s| s.state_change_reason())
                .map(|r| r.to_string()),
            bytes_scanned: stats
                .and_then(|s| s.data_scanned_in_bytes())
                .unwrap_or(0)
                .max(0) as u64,
            execution_time_ms: stats
                .and_then(|s| s.engine_execution_time_in_millis())
                .unwrap_or(0)
                .max(0) as u64,
        })
    }

    async fn cancel(&self, query_id: &str) -> Result<(), AthenaError> {
        info!(query_id = %query_id, "Cancelling query");

        self.athena_client
            .stop_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        info!(query_id = %query_id, "Query cancellation requested");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests: error surface only, no AWS calls
// ---------------------------------------------------------------------------
