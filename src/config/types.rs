//! Configuration types and defaults for subtab.
//!
//! This module defines enums, constants, and default value functions
//! used by the Config and TabConfig structs.

use crate::error::{Result, TabError};
use crate::subprocess::DEFAULT_TIMEOUT_SECONDS;
use serde::{Deserialize, Deserializer, Serialize};

/// Name of the only state a subprocess tab accepts.
pub const ALL_STATE: &str = "All";

/// Type name of the subprocess tab.
pub const SUBPROCESS_TAB_TYPE: &str = "archived-subprocess";

/// Registered tab types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum TabKind {
    /// Runs an external command and uses its output as the tab body.
    #[default]
    ArchivedSubprocess,
    /// Any other type name; rejected when the tab is built.
    Unknown(String),
}

impl TabKind {
    pub fn as_str(&self) -> &str {
        match self {
            TabKind::ArchivedSubprocess => SUBPROCESS_TAB_TYPE,
            TabKind::Unknown(name) => name,
        }
    }
}

impl From<String> for TabKind {
    fn from(name: String) -> Self {
        if name == SUBPROCESS_TAB_TYPE {
            TabKind::ArchivedSubprocess
        } else {
            TabKind::Unknown(name)
        }
    }
}

impl From<TabKind> for String {
    fn from(kind: TabKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Trailing arguments for a tab command.
///
/// A YAML sequence is used verbatim. A single string is split with POSIX
/// shell-word rules (quotes are honoured, nothing is expanded, no shell runs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentList {
    Tokens(Vec<String>),
    Line(String),
}

impl Default for ArgumentList {
    fn default() -> Self {
        ArgumentList::Tokens(Vec::new())
    }
}

impl ArgumentList {
    /// Convert to the token list appended after the GPS time.
    pub fn to_tokens(&self) -> Result<Vec<String>> {
        match self {
            ArgumentList::Tokens(tokens) => Ok(tokens.clone()),
            ArgumentList::Line(line) => shell_words::split(line).map_err(|e| {
                TabError::ConfigError(format!(
                    "failed to split arguments '{}': {}\n\
                     Fix: check for unmatched quotes, or give arguments as a YAML list.",
                    line, e
                ))
            }),
        }
    }
}

/// Accept a YAML string or number and keep it as text.
///
/// GPS times are usually written bare (`gpstime: 1126259462`), which YAML
/// parses as an integer; they are passed to the command opaquely.
pub(crate) fn opt_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Uint(u64),
        Float(f64),
    }

    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Uint(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
    }))
}

// Default value functions for serde
pub(crate) fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}
pub(crate) fn default_states() -> Vec<String> {
    vec![ALL_STATE.to_string()]
}
