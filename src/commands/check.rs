//! Implementation of the `subtab check` command.

use super::load_tabs;
use crate::cli::CheckArgs;
use crate::error::Result;

/// Execute the `subtab check` command.
///
/// Builds every selected tab exactly as `run` would, without running any.
pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let tabs = load_tabs(&args.selection)?;

    for tab in &tabs {
        let spec = tab.spec();
        tracing::debug!(
            tab = tab.name(),
            executable = spec.executable(),
            gpstime = spec.gpstime(),
            gpstime_option = ?spec.gpstime_option(),
            arguments = ?spec.arguments(),
            timeout_secs = tab.timeout_seconds(),
            plots = tab.plots_enabled(),
            "tab ok"
        );
    }

    println!(
        "{}: {} tab(s) OK",
        args.selection.config.display(),
        tabs.len()
    );
    Ok(())
}
