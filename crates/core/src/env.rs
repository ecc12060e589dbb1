//! Environment lookup helpers shared by every config section.
//!
//! All lookups honour the active profile: with `APIWATCH_PROFILE=PROD`,
//! `PROD_{KEY}` is read before `{KEY}`. Empty values count as unset.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

/// Env var naming the active profile.
pub const PROFILE_VAR: &str = "APIWATCH_PROFILE";

pub fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Upper-cased active profile, empty when unset.
pub fn active_profile() -> String {
    env_opt(PROFILE_VAR)
        .map(|s| s.to_uppercase())
        .unwrap_or_default()
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
pub fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

pub fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

pub fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    parse_or(key, profiled_env_opt(profile, key), default)
}

pub fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    parse_or(key, profiled_env_opt(profile, key), default)
}

pub fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    parse_or(key, profiled_env_opt(profile, key), default)
}

/// Parse a numeric env value; unparseable values log a warning and yield `default`.
fn parse_or<T: FromStr + Display + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!(key = %key, value = %v, default = %default, "Invalid numeric env value, using default");
            default
        }),
    }
}
