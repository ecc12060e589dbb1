//! Destination keys for published report artifacts.
//!
//! Every call yields a fresh key: dashboards carry a random suffix, summaries
//! a UTC timestamp plus a short random suffix so two runs inside the same
//! second never overwrite each other.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    /// `dashboards/api_dashboard_{8 hex}.html`
    pub fn dashboard() -> Self {
        Self(format!("dashboards/api_dashboard_{}.html", random_hex(8)))
    }

    /// `summaries/api_summary_{YYYYMMDDTHHMMSSZ}_{6 hex}.txt`
    pub fn summary(now: DateTime<Utc>) -> Self {
        Self(format!(
            "summaries/api_summary_{}_{}.txt",
            now.format("%Y%m%dT%H%M%SZ"),
            random_hex(6)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn random_hex(len: usize) -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex
}
