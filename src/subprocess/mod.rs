//! External command execution for subprocess tabs.
//!
//! - **Spec**: resolves executable, GPS time and arguments into an argv
//! - **Runner**: spawns the argv without a shell, with timeout and capture
//! - **Outcome**: success/failure values and the body formatter

mod outcome;
mod runner;
mod spec;

pub use outcome::{ExecutionResult, Failure, FailureKind, render};
pub use runner::{DEFAULT_TIMEOUT_SECONDS, ProcessRunner, Runner};
pub use spec::{CommandSpec, resolve};
