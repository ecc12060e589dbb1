//! api-summary: Lambda that publishes the top-N text summary.
//!
//! Responds with `Summary uploaded to s3://<bucket>/<key>`.

use apiwatch_report::runtime::run_lambda;
use apiwatch_report::ReportKind;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    run_lambda(ReportKind::Summary).await
}
