//! Command specification and argument vector resolution.

use crate::error::{Result, TabError};

/// The executable, GPS time and arguments configured for one tab.
///
/// Built once when the tab is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    executable: String,
    gpstime_option: Option<String>,
    gpstime: String,
    arguments: Vec<String>,
}

impl CommandSpec {
    /// Create a command spec.
    ///
    /// An empty `gpstime_option` is treated as absent. Returns
    /// `TabError::ConfigError` if `executable` or `gpstime` is empty.
    pub fn new(
        executable: impl Into<String>,
        gpstime_option: Option<String>,
        gpstime: impl Into<String>,
        arguments: Vec<String>,
    ) -> Result<Self> {
        let executable = executable.into();
        let gpstime = gpstime.into();

        if executable.is_empty() {
            return Err(TabError::ConfigError(
                "executable must not be empty".to_string(),
            ));
        }
        if gpstime.is_empty() {
            return Err(TabError::ConfigError("gpstime must not be empty".to_string()));
        }

        Ok(Self {
            executable,
            gpstime_option: gpstime_option.filter(|o| !o.is_empty()),
            gpstime,
            arguments,
        })
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn gpstime_option(&self) -> Option<&str> {
        self.gpstime_option.as_deref()
    }

    pub fn gpstime(&self) -> &str {
        &self.gpstime
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Resolve this spec into the argument vector handed to the runner.
    pub fn resolve(&self) -> Vec<String> {
        resolve(
            &self.executable,
            self.gpstime_option.as_deref().unwrap_or(""),
            &self.gpstime,
            &self.arguments,
        )
    }
}

/// Build `[executable, time_token, ...arguments]`.
///
/// `time_token` is `"<gpstime_option> <gpstime>"` as a single element when the
/// option is non-empty, otherwise `gpstime` verbatim. Argument content is not
/// inspected or escaped; the vector must only be executed without a shell.
pub fn resolve(
    executable: &str,
    gpstime_option: &str,
    gpstime: &str,
    arguments: &[String],
) -> Vec<String> {
    let time_token = if gpstime_option.is_empty() {
        gpstime.to_string()
    } else {
        format!("{} {}", gpstime_option, gpstime)
    };

    let mut argv = Vec::with_capacity(arguments.len() + 2);
    argv.push(executable.to_string());
    argv.push(time_token);
    argv.extend(arguments.iter().cloned());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_without_option() {
        let argv = resolve("/bin/summary", "", "1126259462", &args(&["-o", "out"]));
        assert_eq!(argv, args(&["/bin/summary", "1126259462", "-o", "out"]));
    }

    #[test]
    fn test_resolve_with_option_joins_single_token() {
        let argv = resolve("summary", "-s", "1126259462", &args(&["-v"]));
        assert_eq!(argv.len(), 3);
        assert_eq!(argv[1], "-s 1126259462");
    }

    #[test]
    fn test_resolve_no_trailing_arguments() {
        let argv = resolve("summary", "", "100", &[]);
        assert_eq!(argv, args(&["summary", "100"]));
    }

    #[test]
    fn test_resolve_passes_shell_characters_through() {
        let argv = resolve("summary", "", "100", &args(&["; rm -rf /", "$(id)"]));
        assert_eq!(argv[2], "; rm -rf /");
        assert_eq!(argv[3], "$(id)");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let spec = CommandSpec::new("summary", Some("--gps".into()), "42", args(&["a"])).unwrap();
        assert_eq!(spec.resolve(), spec.resolve());
        assert_eq!(spec.resolve(), args(&["summary", "--gps 42", "a"]));
    }

    #[test]
    fn test_new_normalizes_empty_option() {
        let spec = CommandSpec::new("summary", Some(String::new()), "42", vec![]).unwrap();
        assert_eq!(spec.gpstime_option(), None);
        assert_eq!(spec.resolve(), args(&["summary", "42"]));
    }

    #[test]
    fn test_new_rejects_empty_executable() {
        let err = CommandSpec::new("", None, "42", vec![]).unwrap_err();
        assert!(matches!(err, TabError::ConfigError(_)));
        assert!(err.to_string().contains("executable"));
    }

    #[test]
    fn test_new_rejects_empty_gpstime() {
        let err = CommandSpec::new("summary", None, "", vec![]).unwrap_err();
        assert!(matches!(err, TabError::ConfigError(_)));
        assert!(err.to_string().contains("gpstime"));
    }
}
