//! Site configuration store.
//!
//! The host keeps its configuration as a nested tree (`SYS`, `DB`, `EXT`, ...).
//! [`SiteConfiguration`] wraps that tree and resolves `/`-separated paths such
//! as `"SYS/sitename"`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

const SITE_NAME_PATH: &str = "SYS/sitename";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteConfiguration {
    values: Value,
}

impl SiteConfiguration {
    pub fn new(values: Value) -> Self {
        Self { values }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Looks up a value by `/`-separated path. Empty segments are skipped.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.values, |node, segment| node.get(segment))
    }

    /// Operator-configured display name. `None` when unset or not a string.
    pub fn site_name(&self) -> Option<String> {
        self.get(SITE_NAME_PATH)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_name_lookup() {
        let config = SiteConfiguration::new(json!({ "SYS": { "sitename": "Acme" } }));
        assert_eq!(config.site_name().as_deref(), Some("Acme"));
    }

    #[test]
    fn test_missing_or_non_string_site_name() {
        assert_eq!(SiteConfiguration::default().site_name(), None);

        let config = SiteConfiguration::new(json!({ "SYS": { "sitename": 42 } }));
        assert_eq!(config.site_name(), None);

        let config = SiteConfiguration::new(json!({ "SYS": "flat" }));
        assert_eq!(config.site_name(), None);
    }

    #[test]
    fn test_nested_path_lookup() {
        let config = SiteConfiguration::from_json_str(
            r#"{"DB": {"Connections": {"Default": {"driver": "mysqli"}}}}"#,
        )
        .unwrap();
        assert_eq!(
            config.get("DB/Connections/Default/driver"),
            Some(&json!("mysqli"))
        );
        assert_eq!(config.get("/DB//Connections/"), config.get("DB/Connections"));
        assert!(config.get("DB/Missing").is_none());
    }

    #[test]
    fn test_from_path_reports_errors() {
        let missing = std::env::temp_dir().join(format!(
            "site_harvester_missing_{}.json",
            std::process::id()
        ));
        assert!(matches!(
            SiteConfiguration::from_path(&missing),
            Err(ConfigError::Io(_))
        ));
        assert!(matches!(
            SiteConfiguration::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "site_harvester_config_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"SYS": {"sitename": "From disk"}}"#).unwrap();

        let config = SiteConfiguration::from_path(&path).unwrap();
        assert_eq!(config.site_name().as_deref(), Some("From disk"));

        std::fs::remove_file(path).ok();
    }
}
