//! Execution outcomes and the body formatter.

use serde::Serialize;
use std::fmt;

/// Why a command did not produce a usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The process could not be created (not found, permission denied).
    Launch,
    /// The process ran but exited non-zero or was killed by a signal.
    Exit,
    /// The process ran past its timeout and was killed.
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Launch => write!(f, "launch"),
            FailureKind::Exit => write!(f, "exit"),
            FailureKind::Timeout => write!(f, "timeout"),
        }
    }
}

/// Diagnostic details for a failed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// The argument vector that was attempted.
    pub command: Vec<String>,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// The error text: captured stderr, launch error or timeout notice.
    pub message: String,
    /// Everything the process wrote to stderr (may be empty).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl Failure {
    pub fn launch(command: &[String], cause: &std::io::Error) -> Self {
        Self {
            kind: FailureKind::Launch,
            command: command.to_vec(),
            exit_code: None,
            message: format!("could not start process: {}", cause),
            stderr: String::new(),
        }
    }

    pub fn timeout(command: &[String], seconds: u64, stderr: String) -> Self {
        Self {
            kind: FailureKind::Timeout,
            command: command.to_vec(),
            exit_code: None,
            message: format!("timed out after {}s", seconds),
            stderr,
        }
    }

    /// A process that ran and did not exit successfully.
    ///
    /// The message is the trimmed stderr, falling back to `fallback` when the
    /// process wrote nothing to stderr.
    pub fn exit(
        command: &[String],
        exit_code: Option<i32>,
        stderr: String,
        fallback: String,
    ) -> Self {
        let trimmed = stderr.trim();
        let message = if trimmed.is_empty() {
            fallback
        } else {
            trimmed.to_string()
        };
        Self {
            kind: FailureKind::Exit,
            command: command.to_vec(),
            exit_code,
            message,
            stderr,
        }
    }

    /// The attempted command as a single POSIX-quoted line.
    pub fn command_line(&self) -> String {
        shell_words::join(&self.command)
    }
}

/// The outcome of running a tab's command exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success { output: String },
    Failure(Failure),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ExecutionResult::Failure(failure) => Some(failure),
            ExecutionResult::Success { .. } => None,
        }
    }
}

/// Project a result into the tab body.
///
/// Success yields the captured stdout verbatim; failure yields a fixed-format
/// report naming the command, return code and error message.
pub fn render(result: &ExecutionResult) -> String {
    let failure = match result {
        ExecutionResult::Success { output } => return output.clone(),
        ExecutionResult::Failure(failure) => failure,
    };

    let return_code = failure
        .exit_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string());

    let mut body = String::new();
    body.push_str("Error encountered in subprocess call\n");
    body.push_str("Command attempted:\n");
    body.push_str(&failure.command_line());
    body.push('\n');
    body.push_str("Return code:\n");
    body.push_str(&return_code);
    body.push('\n');
    body.push_str("Error Message:\n");
    body.push_str(&failure.message);
    body.push('\n');

    let stderr = failure.stderr.trim();
    if !stderr.is_empty() && stderr != failure.message {
        body.push_str("Standard error:\n");
        body.push_str(stderr);
        body.push('\n');
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_success_is_verbatim() {
        let result = ExecutionResult::Success {
            output: "ok\n".to_string(),
        };
        assert_eq!(render(&result), "ok\n");
    }

    #[test]
    fn test_render_exit_failure() {
        let failure = Failure::exit(
            &argv(&["summary", "-s 100", "out dir"]),
            Some(2),
            "bad gps time\n".to_string(),
            "process exited with status 2".to_string(),
        );
        let body = render(&ExecutionResult::Failure(failure));

        assert_eq!(
            body,
            "Error encountered in subprocess call\n\
             Command attempted:\n\
             summary '-s 100' 'out dir'\n\
             Return code:\n\
             2\n\
             Error Message:\n\
             bad gps time\n"
        );
    }

    #[test]
    fn test_exit_failure_falls_back_when_stderr_empty() {
        let failure = Failure::exit(
            &argv(&["summary"]),
            Some(3),
            String::new(),
            "process exited with status 3".to_string(),
        );
        assert_eq!(failure.message, "process exited with status 3");
        assert!(render(&ExecutionResult::Failure(failure)).contains("status 3"));
    }

    #[test]
    fn test_render_launch_failure() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let failure = Failure::launch(&argv(&["/nonexistent", "1"]), &err);
        assert_eq!(failure.kind, FailureKind::Launch);

        let body = render(&ExecutionResult::Failure(failure));
        assert!(body.contains("/nonexistent 1"));
        assert!(body.contains("Return code:\nnone\n"));
        assert!(body.contains("could not start process: No such file or directory"));
    }

    #[test]
    fn test_render_timeout_includes_stderr_section() {
        let failure = Failure::timeout(&argv(&["slow"]), 5, "partial progress\n".to_string());
        let body = render(&ExecutionResult::Failure(failure));
        assert!(body.contains("Error Message:\ntimed out after 5s\n"));
        assert!(body.contains("Standard error:\npartial progress\n"));
    }

    #[test]
    fn test_command_and_message_are_distinct() {
        let failure = Failure::exit(
            &argv(&["summary", "100"]),
            Some(1),
            "boom".to_string(),
            String::new(),
        );
        let body = render(&ExecutionResult::Failure(failure));
        assert_eq!(body.matches("summary 100").count(), 1);
    }

    #[test]
    fn test_failure_serializes_with_kind() {
        let failure = Failure::exit(&argv(&["x"]), Some(2), String::new(), "exit 2".to_string());
        let json = serde_json::to_value(ExecutionResult::Failure(failure)).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "exit");
        assert_eq!(json["exit_code"], 2);
        assert!(json.get("stderr").is_none());
    }
}
