//! The archived-subprocess tab.
//!
//! A tab is built from one configuration section at load time. Everything that
//! can be wrong with the section (unknown type, state selection, missing keys,
//! unsplittable arguments) is rejected here, before any process is spawned.
//!
//! # Lifecycle
//!
//! ```text
//! Unresolved --process()--> Running --> Completed(Success | Failure)
//! ```
//!
//! `Completed` is terminal; a tab runs its command at most once.

use crate::config::{ALL_STATE, SUBPROCESS_TAB_TYPE, TabConfig, TabKind};
use crate::error::{Result, TabError};
use crate::subprocess::{CommandSpec, ExecutionResult, ProcessRunner, Runner, render};

/// Where a tab is in its single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabStatus {
    /// Configuration loaded, command not yet run.
    Unresolved,
    /// Command spawned; the caller is blocked on it.
    Running,
    /// Command finished with a recorded outcome.
    Completed(ExecutionResult),
}

/// A report tab whose body is the output of an external command.
#[derive(Debug, Clone)]
pub struct SubprocessTab {
    name: String,
    title: String,
    spec: CommandSpec,
    timeout_seconds: u64,
    status: TabStatus,
}

impl SubprocessTab {
    /// Build a tab from its configuration section.
    ///
    /// `gpstime_override`, when given, replaces the section's `gpstime`.
    ///
    /// # Returns
    ///
    /// * `Ok(SubprocessTab)` - in the `Unresolved` state
    /// * `Err(TabError::ConfigError)` - the section is invalid for this tab type
    pub fn from_config(
        name: &str,
        config: &TabConfig,
        timeout_seconds: u64,
        gpstime_override: Option<&str>,
    ) -> Result<Self> {
        if let TabKind::Unknown(kind) = &config.kind {
            return Err(TabError::ConfigError(format!(
                "tab '{}': unknown tab type '{}' (supported: {})",
                name, kind, SUBPROCESS_TAB_TYPE
            )));
        }

        check_states(name, &config.states)?;

        let executable = config
            .executable
            .as_deref()
            .ok_or_else(|| missing_key(name, "executable"))?;

        let arguments = config
            .arguments
            .as_ref()
            .ok_or_else(|| missing_key(name, "arguments"))?
            .to_tokens()
            .map_err(|e| in_tab(name, e))?;

        let gpstime = gpstime_override
            .or(config.gpstime.as_deref())
            .ok_or_else(|| missing_key(name, "gpstime"))?;

        let spec = CommandSpec::new(
            executable,
            config.gpstime_option.clone(),
            gpstime,
            arguments,
        )
        .map_err(|e| in_tab(name, e))?;

        Ok(Self {
            name: name.to_string(),
            title: config.title.clone().unwrap_or_else(|| name.to_string()),
            spec,
            timeout_seconds,
            status: TabStatus::Unresolved,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn status(&self) -> &TabStatus {
        &self.status
    }

    /// The argument vector this tab runs.
    pub fn argv(&self) -> Vec<String> {
        self.spec.resolve()
    }

    /// Subprocess tabs never render plots.
    pub fn plots_enabled(&self) -> bool {
        false
    }

    /// Run the tab's command once and record the outcome.
    ///
    /// Returns `TabError::UserError` if the tab has already been processed.
    /// Runner faults are propagated and leave the tab `Unresolved`.
    pub fn process(&mut self, runner: &dyn Runner) -> Result<&ExecutionResult> {
        if self.status != TabStatus::Unresolved {
            return Err(TabError::UserError(format!(
                "tab '{}' has already been processed",
                self.name
            )));
        }

        let argv = self.argv();
        self.status = TabStatus::Running;
        let result = match runner.run(&argv) {
            Ok(result) => result,
            Err(e) => {
                self.status = TabStatus::Unresolved;
                return Err(e);
            }
        };

        self.status = TabStatus::Completed(result);
        self.result()
            .ok_or_else(|| TabError::Internal(format!("tab '{}' lost its result", self.name)))
    }

    /// Run the tab's command as a child process under its configured timeout.
    pub fn run(&mut self) -> Result<&ExecutionResult> {
        let runner = ProcessRunner::new(self.timeout_seconds);
        self.process(&runner)
    }

    /// The recorded outcome, once completed.
    pub fn result(&self) -> Option<&ExecutionResult> {
        match &self.status {
            TabStatus::Completed(result) => Some(result),
            _ => None,
        }
    }

    /// The page body: command output, or the failure report.
    pub fn body(&self) -> Option<String> {
        self.result().map(render)
    }
}

fn check_states(name: &str, states: &[String]) -> Result<()> {
    match states {
        [only] if only == ALL_STATE => Ok(()),
        _ => Err(TabError::ConfigError(format!(
            "tab '{}': SubprocessTab does not accept state selection \
             (states must be exactly ['{}'], found {:?})",
            name, ALL_STATE, states
        ))),
    }
}

fn missing_key(name: &str, key: &str) -> TabError {
    TabError::ConfigError(format!("tab '{}': missing required key '{}'", name, key))
}

fn in_tab(name: &str, err: TabError) -> TabError {
    match err {
        TabError::ConfigError(msg) => TabError::ConfigError(format!("tab '{}': {}", name, msg)),
        other => other,
    }
}
