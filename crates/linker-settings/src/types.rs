//! Settings type definitions.
//!
//! Field names are camelCase on disk. Every section is `#[serde(default)]`, so
//! a partial file only needs the keys it changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};
use crate::loader::parse_level;

/// Root settings for the linker.
///
/// ```json
/// {
///   "database": { "path": "/var/lib/linker/domain.db" },
///   "linker": { "projectName": "platform", "batchSize": 1000 },
///   "logging": { "level": "debug", "moduleLevels": { "linker_store": "trace" } }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkerSettings {
    pub database: DatabaseSettings,
    pub linker: LinkerSection,
    pub logging: LoggingSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Path to the SQLite domain database.
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: crate::loader::linker_dir()
                .join("linker.db")
                .to_string_lossy()
                .into_owned(),
        }
    }
}

/// Options for the `LinkPrToIssue` sub-task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkerSection {
    /// Project whose repositories are scanned. Required at run time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Issue reference pattern. `None` uses the built-in `#\d+`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_to_issue_regexp: Option<String>,
    /// Derived rows per sink write.
    pub batch_size: usize,
    /// Source rows fetched per cursor page.
    pub page_size: usize,
    /// Source rows between progress reports.
    pub progress_interval: u64,
}

impl Default for LinkerSection {
    fn default() -> Self {
        Self {
            project_name: None,
            pr_to_issue_regexp: None,
            batch_size: 500,
            page_size: 500,
            progress_interval: 1000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level: `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// Per-module overrides, e.g. `{"linker_store": "debug"}`.
    pub module_levels: BTreeMap<String, String>,
    /// One JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            module_levels: BTreeMap::new(),
            json: false,
        }
    }
}

impl LinkerSettings {
    /// Reject values that deserialize fine but cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(SettingsError::InvalidValue("database.path is empty".into()));
        }
        if self.linker.batch_size == 0 {
            return Err(SettingsError::InvalidValue(
                "linker.batchSize must be positive".into(),
            ));
        }
        if self.linker.page_size == 0 {
            return Err(SettingsError::InvalidValue(
                "linker.pageSize must be positive".into(),
            ));
        }
        if self.linker.progress_interval == 0 {
            return Err(SettingsError::InvalidValue(
                "linker.progressInterval must be positive".into(),
            ));
        }
        if parse_level(&self.logging.level).is_none() {
            return Err(SettingsError::InvalidValue(format!(
                "logging.level {:?} is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        for (module, level) in &self.logging.module_levels {
            if parse_level(level).is_none() {
                return Err(SettingsError::InvalidValue(format!(
                    "logging.moduleLevels.{module} {level:?} is not a log level"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = LinkerSettings::default();
        assert!(settings.database.path.ends_with("linker.db"));
        assert_eq!(settings.linker.batch_size, 500);
        assert_eq!(settings.linker.page_size, 500);
        assert_eq!(settings.linker.progress_interval, 1000);
        assert!(settings.linker.project_name.is_none());
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
        settings.validate().unwrap();
    }

    #[test]
    fn serializes_camel_case_and_skips_unset_options() {
        let json = serde_json::to_value(LinkerSettings::default()).unwrap();
        assert_eq!(json["linker"]["batchSize"], 500);
        assert_eq!(json["logging"]["moduleLevels"], serde_json::json!({}));
        assert!(json["linker"].get("projectName").is_none());
        assert!(json["linker"].get("prToIssueRegexp").is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings: LinkerSettings =
            serde_json::from_str(r#"{"linker": {"prToIssueRegexp": "JIRA-\\d+"}}"#).unwrap();
        assert_eq!(settings.linker.pr_to_issue_regexp.as_deref(), Some(r"JIRA-\d+"));
        assert_eq!(settings.linker.batch_size, 500);
    }

    #[test]
    fn zero_sizes_fail_validation() {
        let mut settings = LinkerSettings::default();
        settings.linker.batch_size = 0;
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidValue(_))));

        let mut settings = LinkerSettings::default();
        settings.linker.page_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = LinkerSettings::default();
        settings.linker.progress_interval = 0;
        assert!(settings.validate().is_err());

        let mut settings = LinkerSettings::default();
        settings.database.path = " ".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unknown_log_levels_fail_validation() {
        let mut settings = LinkerSettings::default();
        settings.logging.level = "loud".into();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"), "got: {err}");

        let mut settings = LinkerSettings::default();
        settings
            .logging
            .module_levels
            .insert("linker_store".into(), "chatty".into());
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("linker_store"), "got: {err}");
    }

    #[test]
    fn log_levels_are_case_insensitive() {
        let mut settings = LinkerSettings::default();
        settings.logging.level = "WARN".into();
        settings
            .logging
            .module_levels
            .insert("linker_store".into(), "Debug".into());
        settings.validate().unwrap();
    }
}
