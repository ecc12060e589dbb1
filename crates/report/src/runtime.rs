//! Process bootstrap shared by the Lambda and CLI binaries.

use std::sync::Arc;

use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use apiwatch_athena::{AthenaClient, AthenaConfig};
use apiwatch_core::{load_dotenv, ReportConfig};
use apiwatch_storage::S3Storage;

use crate::error::ReportError;
use crate::pipeline::{ReportKind, ReportPipeline};
use crate::response::InvocationResponse;

/// Load `.env` (if present), then install the fmt subscriber with
/// `RUST_LOG` overriding the default level.
///
/// Lambda output goes to CloudWatch, which timestamps lines itself and does
/// not render ANSI colors.
pub fn init_tracing(lambda: bool, default_level: &str) {
    load_dotenv();
    let filter = env_filter(default_level);

    if lambda {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// `RUST_LOG` as currently set, else `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Both config sections from the environment. `.env` is already loaded by
/// [`init_tracing`].
pub fn load_settings() -> Result<(AthenaConfig, ReportConfig), ReportError> {
    let athena = AthenaConfig::from_env();
    let report = ReportConfig::from_env()?;
    Ok((athena, report))
}

/// Wire the AWS-backed services into a pipeline. Clients share one SDK config.
pub async fn build_pipeline(athena: AthenaConfig, report: ReportConfig) -> ReportPipeline {
    let sdk_config = athena.sdk_config().await;
    ReportPipeline::new(
        Arc::new(AthenaClient::new(&sdk_config)),
        Arc::new(S3Storage::new(&sdk_config)),
        athena,
        report,
    )
}

/// One Lambda invocation. The event payload is not inspected.
pub async fn handle_event(
    pipeline: &ReportPipeline,
    kind: ReportKind,
    event: LambdaEvent<Value>,
) -> Result<InvocationResponse, lambda_runtime::Error> {
    info!(request_id = %event.context.request_id, kind = %kind, "Invocation received");
    let report = pipeline.run(kind).await?;
    Ok(InvocationResponse::from(&report))
}

/// Entry point for the Lambda binaries: build clients once, then serve events.
pub async fn run_lambda(kind: ReportKind) -> Result<(), lambda_runtime::Error> {
    init_tracing(true, "info");

    let (athena, report) = load_settings()?;
    report.log_summary();

    let pipeline = Arc::new(build_pipeline(athena, report).await);

    info!(kind = %kind, "Lambda runtime starting");
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let pipeline = Arc::clone(&pipeline);
        async move { handle_event(&pipeline, kind, event).await }
    }))
    .await
}
