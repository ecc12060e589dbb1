use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::env::{
    active_profile, profiled_env_opt, profiled_env_or, profiled_env_u32, profiled_env_u64,
    profiled_env_usize,
};
use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

const DEFAULT_TABLE: &str = "cloudtrail_logs";
const DEFAULT_REPORT_BUCKET: &str = "apiwatch-dashboards";
const DEFAULT_ROW_LIMIT: u32 = 1000;
const DEFAULT_TOP_N: usize = 5;
const DEFAULT_URL_EXPIRY_SECONDS: u64 = 3600;

// ── QueryWindow ───────────────────────────────────────────────

/// Inclusive time range the activity query covers (`eventTime BETWEEN start AND end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ConfigError> {
        if start >= end {
            return Err(ConfigError::EmptyWindow {
                start: format_event_time(&start),
                end: format_event_time(&end),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from RFC 3339 strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        Self::new(
            parse_timestamp("start", start)?,
            parse_timestamp("end", end)?,
        )
    }

    /// CloudTrail `eventTime` literal for the start bound.
    pub fn start_literal(&self) -> String {
        format_event_time(&self.start)
    }

    /// CloudTrail `eventTime` literal for the end bound.
    pub fn end_literal(&self) -> String {
        format_event_time(&self.end)
    }
}

impl Default for QueryWindow {
    /// May 2025, the window the reports were first built for.
    fn default() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).single().unwrap_or_default(),
            end: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().unwrap_or_default(),
        }
    }
}

/// `2025-05-01T00:00:00Z`, the format CloudTrail stores `eventTime` in.
fn format_event_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_timestamp(key: &str, value: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| ConfigError::InvalidTimestamp {
            key: key.to_string(),
            value: value.to_string(),
        })
}

// ── ReportConfig ──────────────────────────────────────────────

/// What to query and where to publish the rendered report.
///
/// Reads from environment variables with optional profile prefix.
/// When `APIWATCH_PROFILE=PROD`, checks `PROD_REPORT_BUCKET` before `REPORT_BUCKET`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// CloudTrail table in the Athena catalog.
    pub source_table: String,
    /// Event time range covered by the query.
    pub window: QueryWindow,
    /// `LIMIT` applied to the aggregated query.
    pub row_limit: u32,
    /// Number of ranked lines in the text summary.
    pub top_n: usize,
    /// Bucket receiving dashboards and summaries.
    pub destination_bucket: String,
    /// Lifetime of the pre-signed dashboard URL.
    pub url_expiry_seconds: u64,
}

impl ReportConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_profiled(&active_profile())
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn from_env_profiled(profile: &str) -> Result<Self, ConfigError> {
        let p = profile.to_uppercase();
        let p = p.as_str();

        let defaults = QueryWindow::default();
        let start = match profiled_env_opt(p, "REPORT_START") {
            Some(v) => parse_timestamp("REPORT_START", &v)?,
            None => defaults.start,
        };
        let end = match profiled_env_opt(p, "REPORT_END") {
            Some(v) => parse_timestamp("REPORT_END", &v)?,
            None => defaults.end,
        };

        Ok(Self {
            profile: p.to_string(),
            source_table: profiled_env_or(p, "CLOUDTRAIL_TABLE", DEFAULT_TABLE),
            window: QueryWindow::new(start, end)?,
            row_limit: profiled_env_u32(p, "REPORT_ROW_LIMIT", DEFAULT_ROW_LIMIT),
            top_n: profiled_env_usize(p, "REPORT_TOP_N", DEFAULT_TOP_N),
            destination_bucket: profiled_env_or(p, "REPORT_BUCKET", DEFAULT_REPORT_BUCKET),
            url_expiry_seconds: profiled_env_u64(
                p,
                "REPORT_URL_EXPIRY_SECONDS",
                DEFAULT_URL_EXPIRY_SECONDS,
            ),
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Report config loaded (profile: {}):", self.profile_label());
        tracing::info!("  source:      table={}, limit={}", self.source_table, self.row_limit);
        tracing::info!(
            "  window:      {} .. {}",
            self.window.start_literal(),
            self.window.end_literal()
        );
        tracing::info!(
            "  destination: bucket={}, url_expiry={}s, top_n={}",
            self.destination_bucket,
            self.url_expiry_seconds,
            self.top_n
        );
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            source_table: DEFAULT_TABLE.to_string(),
            window: QueryWindow::default(),
            row_limit: DEFAULT_ROW_LIMIT,
            top_n: DEFAULT_TOP_N,
            destination_bucket: DEFAULT_REPORT_BUCKET.to_string(),
            url_expiry_seconds: DEFAULT_URL_EXPIRY_SECONDS,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────
