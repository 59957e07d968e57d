//! Command implementations for subtab.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the tab loading shared by all of them.

mod check;
mod resolve;
mod run;

use crate::cli::{Command, TabSelection};
use crate::config::Config;
use crate::error::Result;
use crate::tab::SubprocessTab;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::cmd_run(args),
        Command::Resolve(args) => resolve::cmd_resolve(args),
        Command::Check(args) => check::cmd_check(args),
    }
}

/// Load the config and build every selected tab.
///
/// All tabs are built before any is run, so a bad section aborts the whole
/// report at load time rather than halfway through.
pub(crate) fn load_tabs(selection: &TabSelection) -> Result<Vec<SubprocessTab>> {
    let config = Config::load(&selection.config)?;
    build_tabs(&config, selection)
}

pub(crate) fn build_tabs(config: &Config, selection: &TabSelection) -> Result<Vec<SubprocessTab>> {
    let tabs = config
        .select_tabs(&selection.tabs)?
        .into_iter()
        .map(|(name, tab)| {
            SubprocessTab::from_config(
                name,
                tab,
                config.timeout_for(tab),
                selection.gpstime.as_deref(),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        config = %selection.config.display(),
        tabs = tabs.len(),
        "loaded tabs"
    );
    Ok(tabs)
}
