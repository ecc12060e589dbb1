//! api-dashboard: Lambda that publishes the API activity chart.
//!
//! Responds with `Dashboard uploaded: <pre-signed url>`.

use apiwatch_report::runtime::run_lambda;
use apiwatch_report::ReportKind;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    run_lambda(ReportKind::Dashboard).await
}
