//! Submit → poll → fetch → render → publish, for one report per invocation.
//!
//! [`ReportPipeline`] owns no clients of its own: the query service and
//! object storage are injected, so the whole flow runs unchanged against
//! in-process doubles.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use apiwatch_athena::{wait_for_completion, ApiActivityQuery, AthenaConfig, QueryService};
use apiwatch_core::ReportConfig;
use apiwatch_storage::{ArtifactKey, ObjectStorage};

use crate::error::ReportError;
use crate::render::{ChartRenderer, RenderedArtifact, SummaryRenderer};
use crate::rows::{parse_rows, ApiCallRow};

// ---------------------------------------------------------------------------
// Kinds and stages
// ---------------------------------------------------------------------------

/// Which artifact an invocation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// HTML bar chart plus a pre-signed link.
    Dashboard,
    /// Plain-text top-N digest.
    Summary,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Dashboard => f.write_str("dashboard"),
            ReportKind::Summary => f.write_str("summary"),
        }
    }
}

/// Progress of one run. A run that errors stops at the stage it had reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Start,
    Submitted,
    Polling,
    Succeeded,
    Fetched,
    Rendered,
    Published,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowStage::Start => "start",
            FlowStage::Submitted => "submitted",
            FlowStage::Polling => "polling",
            FlowStage::Succeeded => "succeeded",
            FlowStage::Fetched => "fetched",
            FlowStage::Rendered => "rendered",
            FlowStage::Published => "published",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What a successful run uploaded.
#[derive(Debug, Clone)]
pub struct PublishedReport {
    pub kind: ReportKind,
    pub query_id: String,
    pub row_count: usize,
    pub bucket: String,
    pub key: String,
    /// Pre-signed GET link; dashboards only.
    pub url: Option<String>,
    pub artifact: RenderedArtifact,
}

impl PublishedReport {
    /// Human-readable result returned to the caller.
    pub fn message(&self) -> String {
        match (self.kind, &self.url) {
            (ReportKind::Dashboard, Some(url)) => format!("Dashboard uploaded: {}", url),
            (ReportKind::Dashboard, None) => {
                format!("Dashboard uploaded to s3://{}/{}", self.bucket, self.key)
            }
            (ReportKind::Summary, _) => {
                format!("Summary uploaded to s3://{}/{}", self.bucket, self.key)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct ReportPipeline {
    queries: Arc<dyn QueryService>,
    storage: Arc<dyn ObjectStorage>,
    athena: AthenaConfig,
    report: ReportConfig,
}

impl ReportPipeline {
    pub fn new(
        queries: Arc<dyn QueryService>,
        storage: Arc<dyn ObjectStorage>,
        athena: AthenaConfig,
        report: ReportConfig,
    ) -> Self {
        Self {
            queries,
            storage,
            athena,
            report,
        }
    }

    /// Run the whole flow once. Nothing is uploaded unless the query succeeds.
    pub async fn run(&self, kind: ReportKind) -> Result<PublishedReport, ReportError> {
        let mut stage = FlowStage::Start;
        let result = self.execute(kind, &mut stage).await;

        match &result {
            Ok(report) => info!(
                kind = %kind,
                query_id = %report.query_id,
                key = %report.key,
                rows = report.row_count,
                "Report published"
            ),
            Err(e) => error!(kind = %kind, stage = %stage, error = %e, "Report aborted"),
        }
        result
    }

    async fn execute(
        &self,
        kind: ReportKind,
        stage: &mut FlowStage,
    ) -> Result<PublishedReport, ReportError> {
        let request = ApiActivityQuery::from_report_config(&self.report).request(&self.athena);
        let query_id = self.queries.submit(&request).await?;
        advance(stage, FlowStage::Submitted, &query_id);

        advance(stage, FlowStage::Polling, &query_id);
        wait_for_completion(self.queries.as_ref(), &query_id, &self.athena.poll_policy()).await?;
        advance(stage, FlowStage::Succeeded, &query_id);

        let rows = self.fetch_rows(&query_id).await?;
        advance(stage, FlowStage::Fetched, &query_id);

        let artifact = self.render(kind, &rows)?;
        advance(stage, FlowStage::Rendered, &query_id);

        let (key, url) = self.publish(kind, &artifact).await?;
        advance(stage, FlowStage::Published, &query_id);

        Ok(PublishedReport {
            kind,
            query_id,
            row_count: rows.len(),
            bucket: self.report.destination_bucket.clone(),
            key,
            url,
            artifact,
        })
    }

    /// Download and parse the CSV Athena wrote for `query_id`.
    async fn fetch_rows(&self, query_id: &str) -> Result<Vec<ApiCallRow>, ReportError> {
        let key = self.athena.result_key(query_id);
        let data = self
            .storage
            .get_object(&self.athena.output_bucket, &key)
            .await?;
        let rows = parse_rows(&data)?;
        info!(query_id = %query_id, rows = rows.len(), bytes = data.len(), "Fetched query result");
        Ok(rows)
    }

    fn render(&self, kind: ReportKind, rows: &[ApiCallRow]) -> Result<RenderedArtifact, ReportError> {
        match kind {
            ReportKind::Dashboard => ChartRenderer::new().render(rows),
            ReportKind::Summary => Ok(SummaryRenderer::new(self.report.top_n).render(rows)),
        }
    }

    /// Upload under a fresh key; dashboards also get a pre-signed link.
    async fn publish(
        &self,
        kind: ReportKind,
        artifact: &RenderedArtifact,
    ) -> Result<(String, Option<String>), ReportError> {
        let bucket = &self.report.destination_bucket;
        let key = match kind {
            ReportKind::Dashboard => ArtifactKey::dashboard(),
            ReportKind::Summary => ArtifactKey::summary(Utc::now()),
        };

        self.storage
            .put_object(
                bucket,
                key.as_str(),
                Bytes::from(artifact.body.clone()),
                artifact.content_type,
            )
            .await?;

        let url = match kind {
            ReportKind::Dashboard => Some(
                self.storage
                    .presigned_get_url(
                        bucket,
                        key.as_str(),
                        Duration::from_secs(self.report.url_expiry_seconds),
                    )
                    .await?,
            ),
            ReportKind::Summary => None,
        };

        Ok((key.into_string(), url))
    }
}

fn advance(stage: &mut FlowStage, next: FlowStage, query_id: &str) {
    *stage = next;
    info!(stage = %next, query_id = %query_id, "Report stage");
}
