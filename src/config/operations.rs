//! Config loading, validation, and tab selection.

use super::model::{Config, TabConfig};
use crate::error::{Result, TabError};
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(TabError::UserError)` - The file could not be read
    /// * `Err(TabError::ConfigError)` - Parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            TabError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| TabError::ConfigError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - at least one tab section is present
    /// - `default_timeout_seconds` must be positive
    /// - every `timeout_seconds` that is set must be positive
    ///
    /// Per-tab key requirements are checked when each tab is built.
    pub fn validate(&self) -> Result<()> {
        if self.tabs.is_empty() {
            return Err(TabError::ConfigError(
                "no tabs configured: add at least one section under 'tabs'".to_string(),
            ));
        }

        if self.default_timeout_seconds == 0 {
            return Err(TabError::ConfigError(
                "default_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        for (name, tab) in &self.tabs {
            if tab.timeout_seconds == Some(0) {
                return Err(TabError::ConfigError(format!(
                    "tab '{}': timeout_seconds must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Effective timeout for a tab in seconds.
    pub fn timeout_for(&self, tab: &TabConfig) -> u64 {
        tab.timeout_seconds.unwrap_or(self.default_timeout_seconds)
    }

    /// Select tab sections by name, in name order.
    ///
    /// An empty `names` selects every tab. Unknown names are a config error.
    pub fn select_tabs(&self, names: &[String]) -> Result<Vec<(&str, &TabConfig)>> {
        if names.is_empty() {
            return Ok(self.tabs.iter().map(|(n, t)| (n.as_str(), t)).collect());
        }

        if let Some(missing) = names.iter().find(|n| !self.tabs.contains_key(*n)) {
            return Err(TabError::ConfigError(format!(
                "tab '{}' not found.\n\nConfigured tabs: {}",
                missing,
                self.tabs.keys().cloned().collect::<Vec<_>>().join(", ")
            )));
        }

        Ok(self
            .tabs
            .iter()
            .filter(|(n, _)| names.contains(n))
            .map(|(n, t)| (n.as_str(), t))
            .collect())
    }
}
