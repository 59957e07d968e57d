//! Implementation of the `subtab resolve` command.
//!
//! Prints the argument vector each tab would run, shell-quoted, one tab per
//! line. Nothing is executed.

use super::load_tabs;
use crate::cli::ResolveArgs;
use crate::error::Result;
use crate::tab::SubprocessTab;

/// Execute the `subtab resolve` command.
pub fn cmd_resolve(args: ResolveArgs) -> Result<()> {
    let tabs = load_tabs(&args.selection)?;
    print!("{}", format_resolved(&tabs));
    Ok(())
}

fn format_resolved(tabs: &[SubprocessTab]) -> String {
    tabs.iter()
        .map(|tab| format!("{}: {}\n", tab.name(), shell_words::join(tab.argv())))
        .collect()
}
