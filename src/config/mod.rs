//! Configuration model for subtab.
//!
//! This module defines the Config struct that represents a report's YAML
//! configuration: a set of named tab sections plus shared defaults. Optional
//! keys map to named `Option` fields and are resolved once, at load time.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::{Config, TabConfig};
pub use types::{ALL_STATE, ArgumentList, SUBPROCESS_TAB_TYPE, TabKind};
