use serde::{Deserialize, Serialize};

use crate::pipeline::PublishedReport;

/// Lambda proxy-style result: `{"statusCode": 200, "body": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }
}

impl From<&PublishedReport> for InvocationResponse {
    fn from(report: &PublishedReport) -> Self {
        Self::ok(report.message())
    }
}
