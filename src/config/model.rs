//! Config and TabConfig struct definitions and default implementations.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for a subtab report run.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timeout applied to tabs that do not set `timeout_seconds`.
    #[serde(default = "default_timeout_seconds")]
    pub default_timeout_seconds: u64,

    /// Tab sections keyed by tab name, processed in name order.
    #[serde(default)]
    pub tabs: BTreeMap<String, TabConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timeout_seconds: default_timeout_seconds(),
            tabs: BTreeMap::new(),
        }
    }
}

/// One tab section.
///
/// Required keys are `Option`s here so a missing key is reported against the
/// tab that lacks it when the tab is built, instead of as a YAML parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabConfig {
    /// Tab type (default: `archived-subprocess`).
    #[serde(rename = "type")]
    pub kind: TabKind,

    /// Display title; the section name is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Path or command name to execute (required).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,

    /// Trailing arguments (required, may be empty).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<ArgumentList>,

    /// GPS timestamp token (required unless overridden on the command line).
    #[serde(
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub gpstime: Option<String>,

    /// Flag prepended to the GPS time, e.g. `-s` gives `"-s 1126259462"`.
    #[serde(
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub gpstime_option: Option<String>,

    /// Declared states; must be exactly `["All"]`.
    #[serde(default = "default_states")]
    pub states: Vec<String>,

    /// Per-tab timeout in seconds, overriding `default_timeout_seconds`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            kind: TabKind::default(),
            title: None,
            executable: None,
            arguments: None,
            gpstime: None,
            gpstime_option: None,
            states: default_states(),
            timeout_seconds: None,
        }
    }
}
