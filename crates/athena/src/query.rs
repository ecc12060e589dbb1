use serde::{Deserialize, Serialize};

use apiwatch_core::{QueryWindow, ReportConfig};

use crate::config::AthenaConfig;

/// Column aliases produced by [`ApiActivityQuery`], in select order.
pub mod columns {
    pub const EVENT_SOURCE: &str = "eventSource";
    pub const USER_AGENT: &str = "userAgent";
    pub const PRINCIPAL_TYPE: &str = "principal_type";
    pub const PRINCIPAL: &str = "principal";
    pub const EVENT_NAME: &str = "eventName";
    pub const FREQUENCY: &str = "frequency";

    pub const ALL: [&str; 6] = [
        EVENT_SOURCE,
        USER_AGENT,
        PRINCIPAL_TYPE,
        PRINCIPAL,
        EVENT_NAME,
        FREQUENCY,
    ];
}

/// Sentinel the query substitutes for calls without an identity ARN.
pub const UNKNOWN_PRINCIPAL: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything Athena needs to start one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
    pub database: String,
    pub workgroup: String,
    /// `s3://bucket/prefix/` the CSV result is written under.
    pub output_location: String,
}

// ---------------------------------------------------------------------------
// API activity query
// ---------------------------------------------------------------------------

/// Aggregated CloudTrail API calls per (source, agent, principal, event name),
/// most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiActivityQuery {
    pub table: String,
    pub window: QueryWindow,
    pub limit: u32,
}

impl ApiActivityQuery {
    pub fn new(table: impl Into<String>, window: QueryWindow, limit: u32) -> Self {
        Self {
            table: table.into(),
            window,
            limit,
        }
    }

    pub fn from_report_config(config: &ReportConfig) -> Self {
        Self::new(config.source_table.clone(), config.window, config.row_limit)
    }

    pub fn to_sql(&self) -> String {
        let principal = format!("COALESCE(userIdentity.arn, '{}')", UNKNOWN_PRINCIPAL);
        format!(
            "SELECT\n  \
               eventSource,\n  \
               userAgent,\n  \
               userIdentity.type AS {principal_type},\n  \
               {principal} AS {principal_col},\n  \
               eventName,\n  \
               COUNT(*) AS {frequency}\n\
             FROM {table}\n\
             WHERE eventTime BETWEEN '{start}' AND '{end}'\n\
             GROUP BY eventSource, userAgent, userIdentity.type, {principal}, eventName\n\
             ORDER BY {frequency} DESC\n\
             LIMIT {limit};",
            principal_type = columns::PRINCIPAL_TYPE,
            principal = principal,
            principal_col = columns::PRINCIPAL,
            frequency = columns::FREQUENCY,
            table = self.table,
            start = self.window.start_literal(),
            end = self.window.end_literal(),
            limit = self.limit,
        )
    }

    /// Bind the SQL to the database and result location from `config`.
    pub fn request(&self, config: &AthenaConfig) -> QueryRequest {
        QueryRequest {
            sql: self.to_sql(),
            database: config.database.clone(),
            workgroup: config.workgroup.clone(),
            output_location: config.output_location(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
