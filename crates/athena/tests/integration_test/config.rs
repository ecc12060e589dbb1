//! Tests for AthenaConfig: environment loading and profiles.

use std::env;
use std::sync::Mutex;
use std::time::Duration;

use apiwatch_athena::*;

// Env-based tests must run serially to avoid interfering with each other.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_athena_env() {
    let keys = [
        "APIWATCH_PROFILE",
        "ATHENA_REGION",
        "ATHENA_DATABASE",
        "ATHENA_WORKGROUP",
        "ATHENA_OUTPUT_BUCKET",
        "ATHENA_OUTPUT_PREFIX",
        "ATHENA_POLL_INTERVAL_MS",
        "ATHENA_TIMEOUT_SECONDS",
        "AWS_REGION",
        "STAGING_ATHENA_OUTPUT_BUCKET",
    ];
    for k in keys {
        env::remove_var(k);
    }
}

#[test]
fn test_config_from_env() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_athena_env();

    env::set_var("ATHENA_REGION", "us-west-2");
    env::set_var("ATHENA_DATABASE", "audit");
    env::set_var("ATHENA_WORKGROUP", "reports");
    env::set_var("ATHENA_OUTPUT_BUCKET", "my-athena-queries-1");
    env::set_var("ATHENA_OUTPUT_PREFIX", "athena/results");
    env::set_var("ATHENA_POLL_INTERVAL_MS", "500");
    env::set_var("ATHENA_TIMEOUT_SECONDS", "0");

    let cfg = AthenaConfig::from_env();

    assert_eq!(cfg.region, "us-west-2");
    assert_eq!(cfg.database, "audit");
    assert_eq!(cfg.workgroup, "reports");
    assert_eq!(cfg.output_location(), "s3://my-athena-queries-1/athena/results/");
    assert_eq!(cfg.result_key("q-7"), "athena/results/q-7.csv");

    let policy = cfg.poll_policy();
    assert_eq!(policy.interval, Duration::from_millis(500));
    assert_eq!(policy.timeout, None);

    clear_athena_env();
}

#[test]
fn test_profile_selected_through_env() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_athena_env();

    env::set_var("APIWATCH_PROFILE", "staging");
    env::set_var("ATHENA_OUTPUT_BUCKET", "prod-results");
    env::set_var("STAGING_ATHENA_OUTPUT_BUCKET", "staging-results");

    let cfg = AthenaConfig::from_env();
    assert_eq!(cfg.output_bucket, "staging-results");

    clear_athena_env();
}
