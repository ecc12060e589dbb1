//! apiwatch: run a report once from a workstation.
//!
//! Same flow as the Lambda functions, configured from the environment
//! (and `.env`), with flag overrides for ad-hoc windows and buckets.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use apiwatch_athena::AthenaConfig;
use apiwatch_core::config::parse_timestamp;
use apiwatch_core::{QueryWindow, ReportConfig};
use apiwatch_report::runtime::{build_pipeline, init_tracing};
use apiwatch_report::ReportKind;

// ── CLI ─────────────────────────────────────────────────────────────

/// Query CloudTrail activity in Athena and publish a report to S3.
#[derive(Parser, Debug)]
#[command(name = "apiwatch", version, about)]
struct Cli {
    /// Report to produce.
    #[arg(value_enum)]
    kind: ReportKind,

    /// Config profile; `PROFILE_`-prefixed env vars win over plain ones.
    #[arg(long, env = "APIWATCH_PROFILE", default_value = "")]
    profile: String,

    /// Window start (RFC 3339), overrides REPORT_START.
    #[arg(long)]
    start: Option<String>,

    /// Window end (RFC 3339), overrides REPORT_END.
    #[arg(long)]
    end: Option<String>,

    /// CloudTrail table, overrides CLOUDTRAIL_TABLE.
    #[arg(long)]
    table: Option<String>,

    /// Destination bucket, overrides REPORT_BUCKET.
    #[arg(long)]
    bucket: Option<String>,

    /// Maximum seconds to wait for the query (0 = no limit).
    #[arg(long)]
    timeout_secs: Option<u32>,

    /// Delay between status checks in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Also write the rendered artifact to stdout.
    #[arg(long)]
    print: bool,
}

impl Cli {
    fn apply_overrides(&self, athena: &mut AthenaConfig, report: &mut ReportConfig) -> Result<()> {
        if self.start.is_some() || self.end.is_some() {
            let start = match &self.start {
                Some(s) => parse_timestamp("--start", s)?,
                None => report.window.start,
            };
            let end = match &self.end {
                Some(s) => parse_timestamp("--end", s)?,
                None => report.window.end,
            };
            report.window = QueryWindow::new(start, end)?;
        }
        if let Some(table) = &self.table {
            report.source_table = table.clone();
        }
        if let Some(bucket) = &self.bucket {
            report.destination_bucket = bucket.clone();
        }
        if let Some(secs) = self.timeout_secs {
            athena.timeout_seconds = secs;
        }
        if let Some(ms) = self.poll_interval_ms {
            athena.poll_interval_ms = ms;
        }
        Ok(())
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Loads `.env` too, so `RUST_LOG` and `APIWATCH_PROFILE` from it apply below.
    init_tracing(false, "info");

    let cli = Cli::parse();

    let profile = cli.profile.to_uppercase();
    let mut athena = AthenaConfig::from_env_profiled(&profile);
    let mut report =
        ReportConfig::from_env_profiled(&profile).context("invalid report configuration")?;
    cli.apply_overrides(&mut athena, &mut report)?;
    report.log_summary();

    let pipeline = build_pipeline(athena, report).await;
    info!(kind = %cli.kind, "apiwatch starting");

    let published = pipeline
        .run(cli.kind)
        .await
        .with_context(|| format!("{} report failed", cli.kind))?;

    if cli.print {
        println!("{}", published.artifact.body);
    }
    println!("{}", published.message());

    Ok(())
}
