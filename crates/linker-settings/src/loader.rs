//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`LinkerSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `LINKER_*` environment variable overrides
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::LinkerSettings;

pub const MAX_BATCH_SIZE: usize = 100_000;
pub const MAX_PAGE_SIZE: usize = 100_000;
pub const MAX_PROGRESS_INTERVAL: u64 = 10_000_000;

/// `~/.linker`, or `/tmp/.linker` when `HOME` is unset.
pub fn linker_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".linker")
}

/// Resolve the path to the settings file (`~/.linker/settings.json`).
pub fn settings_path() -> PathBuf {
    linker_dir().join("settings.json")
}

/// An environment override that failed to parse and was ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedOverride {
    pub key: &'static str,
    pub value: String,
}

impl RejectedOverride {
    pub fn log(&self) {
        warn!(key = self.key, value = %self.value, "invalid env var, ignoring");
    }
}

/// Settings plus the overrides that were ignored while loading them.
///
/// Loading usually runs before a subscriber exists, so rejected overrides
/// are returned for the caller to log once telemetry is up.
#[derive(Clone, Debug)]
pub struct LoadedSettings {
    pub settings: LinkerSettings,
    pub rejected: Vec<RejectedOverride>,
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LoadedSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or a value that fails
/// validation is an error.
pub fn load_settings_from_path(path: &Path) -> Result<LoadedSettings> {
    let mut settings = read_file_layer(path)?;
    let rejected = apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(LoadedSettings { settings, rejected })
}

fn read_file_layer(path: &Path) -> Result<LinkerSettings> {
    let defaults = serde_json::to_value(LinkerSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `LINKER_*` overrides from the process environment.
pub fn apply_env_overrides(settings: &mut LinkerSettings) -> Vec<RejectedOverride> {
    apply_overrides(settings, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`.
///
/// Numbers must parse and fall in range, booleans accept
/// `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`. Anything else is
/// ignored, leaving the file/default value in place, and returned.
pub fn apply_overrides<F>(settings: &mut LinkerSettings, lookup: F) -> Vec<RejectedOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let mut rejected = Vec::new();
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── Database ────────────────────────────────────────────────────
    if let Some(v) = string("LINKER_DB_PATH") {
        settings.database.path = v;
    }

    // ── Linker ──────────────────────────────────────────────────────
    if let Some(v) = string("LINKER_PROJECT_NAME") {
        settings.linker.project_name = Some(v);
    }
    if let Some(v) = string("LINKER_PR_TO_ISSUE_REGEXP") {
        settings.linker.pr_to_issue_regexp = Some(v);
    }
    if let Some(v) = read_checked(&lookup, &mut rejected, "LINKER_BATCH_SIZE", |s| {
        parse_usize_range(s, 1, MAX_BATCH_SIZE)
    }) {
        settings.linker.batch_size = v;
    }
    if let Some(v) = read_checked(&lookup, &mut rejected, "LINKER_PAGE_SIZE", |s| {
        parse_usize_range(s, 1, MAX_PAGE_SIZE)
    }) {
        settings.linker.page_size = v;
    }
    if let Some(v) = read_checked(&lookup, &mut rejected, "LINKER_PROGRESS_INTERVAL", |s| {
        parse_u64_range(s, 1, MAX_PROGRESS_INTERVAL)
    }) {
        settings.linker.progress_interval = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_checked(&lookup, &mut rejected, "LINKER_LOG_LEVEL", parse_level) {
        settings.logging.level = v;
    }
    if let Some(v) = read_checked(&lookup, &mut rejected, "LINKER_LOG_JSON", parse_bool) {
        settings.logging.json = v;
    }
    rejected
}

fn read_checked<F, T>(
    lookup: &F,
    rejected: &mut Vec<RejectedOverride>,
    key: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    let result = parse(&value);
    if result.is_none() {
        rejected.push(RejectedOverride { key, value });
    }
    result
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Normalized lowercase level name, if it is one `tracing` knows.
pub fn parse_level(val: &str) -> Option<String> {
    let lower = val.trim().to_lowercase();
    matches!(lower.as_str(), "trace" | "debug" | "info" | "warn" | "error").then_some(lower)
}
