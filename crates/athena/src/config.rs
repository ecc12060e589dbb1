use std::time::Duration;

use aws_config::BehaviorVersion;
use serde::{Deserialize, Serialize};

use apiwatch_core::env::{
    active_profile, profiled_env_opt, profiled_env_or, profiled_env_u32, profiled_env_u64,
};

use crate::poller::PollPolicy;

/// Default bucket Athena writes query results into.
const DEFAULT_OUTPUT_BUCKET: &str = "apiwatch-athena-results";

const DEFAULT_OUTPUT_PREFIX: &str = "query-results/";

const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

const DEFAULT_TIMEOUT_SECONDS: u32 = 300;

// ── AthenaConfig ─────────────────────────────────────────────────

/// Configuration for the Athena side of a report run.
///
/// Reads from environment variables with optional profile prefix.
/// When `APIWATCH_PROFILE=PROD`, checks `PROD_ATHENA_DATABASE` before `ATHENA_DATABASE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// AWS region for Athena and S3.
    pub region: String,
    /// Athena database name.
    pub database: String,
    /// Athena workgroup.
    pub workgroup: String,
    /// Bucket Athena writes CSV results into.
    pub output_bucket: String,
    /// Key prefix for results inside `output_bucket`, always ending in `/`.
    pub output_prefix: String,
    /// Delay between status checks in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum time to wait for a terminal state (0 = wait forever).
    pub timeout_seconds: u32,
}

impl AthenaConfig {
    /// Build config from environment variables.
    ///
    /// `ATHENA_REGION` falls back to `AWS_REGION` before using the default.
    pub fn from_env() -> Self {
        Self::from_env_profiled(&active_profile())
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        let region = profiled_env_opt(profile, "ATHENA_REGION")
            .or_else(|| profiled_env_opt(profile, "AWS_REGION"))
            .unwrap_or_else(|| "us-east-1".to_string());

        Self {
            region,
            database: profiled_env_or(profile, "ATHENA_DATABASE", "default"),
            workgroup: profiled_env_or(profile, "ATHENA_WORKGROUP", "primary"),
            output_bucket: profiled_env_or(profile, "ATHENA_OUTPUT_BUCKET", DEFAULT_OUTPUT_BUCKET),
            output_prefix: normalize_prefix(&profiled_env_or(
                profile,
                "ATHENA_OUTPUT_PREFIX",
                DEFAULT_OUTPUT_PREFIX,
            )),
            poll_interval_ms: profiled_env_u64(
                profile,
                "ATHENA_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            ),
            timeout_seconds: profiled_env_u32(
                profile,
                "ATHENA_TIMEOUT_SECONDS",
                DEFAULT_TIMEOUT_SECONDS,
            ),
        }
    }

    /// `s3://` URI handed to Athena as the result location.
    pub fn output_location(&self) -> String {
        format!("s3://{}/{}", self.output_bucket, self.output_prefix)
    }

    /// Key of the CSV Athena writes for `query_id` inside `output_bucket`.
    pub fn result_key(&self, query_id: &str) -> String {
        format!("{}{}.csv", self.output_prefix, query_id)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            timeout: match self.timeout_seconds {
                0 => None,
                secs => Some(Duration::from_secs(secs as u64)),
            },
        }
    }

    /// Load the shared AWS SDK config for this region.
    ///
    /// Credentials come from the default provider chain (Lambda role,
    /// env vars, or `~/.aws`).
    pub async fn sdk_config(&self) -> aws_config::SdkConfig {
        let region = aws_sdk_athena::config::Region::new(self.region.clone());
        aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await
    }
}

impl Default for AthenaConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            database: "default".to_string(),
            workgroup: "primary".to_string(),
            output_bucket: DEFAULT_OUTPUT_BUCKET.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Strip leading slashes and guarantee a trailing one; empty stays empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────
