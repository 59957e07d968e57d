//! Implementation of the `subtab run` command.
//!
//! Builds every selected tab, runs each tab's command once, then emits the
//! bodies (stdout and/or body files) and the optional run record. Output
//! always follows tab name order, whatever order the tabs finish in.

use super::load_tabs;
use crate::cli::{OutputFormat, RunArgs};
use crate::error::{Result, TabError};
use crate::events::{Outcome, RunRecord, append_records};
use crate::fs::write_body;
use crate::tab::SubprocessTab;
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Execute the `subtab run` command.
pub fn cmd_run(args: RunArgs) -> Result<()> {
    let mut tabs = load_tabs(&args.selection)?;
    let durations = process_tabs(&mut tabs, args.jobs as usize)?;

    if let Some(record_path) = &args.record {
        let records: Vec<RunRecord> = tabs
            .iter()
            .zip(&durations)
            .filter_map(|(tab, duration)| {
                tab.result()
                    .map(|result| RunRecord::new(tab.name(), tab.argv(), result, *duration))
            })
            .collect();
        append_records(record_path, &records)?;
    }

    if let Some(dir) = &args.output_dir {
        for tab in &tabs {
            let body = tab.body().unwrap_or_default();
            let path = write_body(dir, tab.name(), &body)?;
            tracing::debug!(tab = tab.name(), path = %path.display(), "wrote tab body");
        }
    }

    match args.format {
        OutputFormat::Text => print!("{}", format_text(&tabs)),
        OutputFormat::Json => println!("{}", format_json(&tabs)?),
        OutputFormat::Silent => {}
    }

    let failed = tabs
        .iter()
        .filter(|t| t.result().is_some_and(|r| !r.is_success()))
        .count();
    if failed > 0 {
        tracing::warn!(failed, total = tabs.len(), "some tab commands failed");
        if args.strict {
            return Err(TabError::TabFailures {
                failed,
                total: tabs.len(),
            });
        }
    }

    Ok(())
}

/// Run every tab, at most `jobs` at a time.
///
/// Returns the wall time spent on each tab, in tab order.
pub(crate) fn process_tabs(tabs: &mut [SubprocessTab], jobs: usize) -> Result<Vec<Duration>> {
    if tabs.is_empty() {
        return Ok(Vec::new());
    }

    if jobs <= 1 {
        return tabs.iter_mut().map(process_one).collect();
    }

    let slots: Vec<Mutex<&mut SubprocessTab>> = tabs.iter_mut().map(Mutex::new).collect();
    let next = AtomicUsize::new(0);
    let workers = jobs.min(slots.len());
    let (slots, next) = (&slots, &next);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || -> Result<Vec<(usize, Duration)>> {
                    let mut finished = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(slot) = slots.get(index) else {
                            break;
                        };
                        let mut tab = slot
                            .lock()
                            .map_err(|_| TabError::Internal("tab slot poisoned".to_string()))?;
                        finished.push((index, process_one(&mut **tab)?));
                    }
                    Ok(finished)
                })
            })
            .collect();

        let mut durations = vec![Duration::ZERO; slots.len()];
        for handle in handles {
            let finished = handle
                .join()
                .map_err(|_| TabError::Internal("tab worker thread panicked".to_string()))??;
            for (index, duration) in finished {
                durations[index] = duration;
            }
        }
        Ok(durations)
    })
}

fn process_one(tab: &mut SubprocessTab) -> Result<Duration> {
    tracing::info!(tab = tab.name(), "processing tab");
    let start = Instant::now();
    tab.run()?;
    Ok(start.elapsed())
}

/// Bodies under `==> name <==` headers, in tab order.
pub(crate) fn format_text(tabs: &[SubprocessTab]) -> String {
    let mut out = String::new();
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if tab.title() == tab.name() {
            out.push_str(&format!("==> {} <==\n", tab.name()));
        } else {
            out.push_str(&format!("==> {} ({}) <==\n", tab.name(), tab.title()));
        }

        let body = tab.body().unwrap_or_default();
        out.push_str(&body);
        if !body.is_empty() && !body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

#[derive(Serialize)]
struct TabReport<'a> {
    tab: &'a str,
    title: &'a str,
    status: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    body: Option<String>,
}

/// Bodies as a JSON array, one object per tab.
pub(crate) fn format_json(tabs: &[SubprocessTab]) -> Result<String> {
    let reports: Vec<TabReport> = tabs
        .iter()
        .map(|tab| {
            let result = tab.result();
            TabReport {
                tab: tab.name(),
                title: tab.title(),
                status: result.map(|r| {
                    if r.is_success() {
                        Outcome::Success
                    } else {
                        Outcome::Failure
                    }
                }),
                exit_code: result.and_then(|r| match r.failure() {
                    Some(failure) => failure.exit_code,
                    None => Some(0),
                }),
                body: tab.body(),
            }
        })
        .collect();

    serde_json::to_string_pretty(&reports)
        .map_err(|e| TabError::UserError(format!("failed to serialize tab bodies: {}", e)))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cli::TabSelection;
    use crate::commands::test_helpers::*;
    use serde_json::Value;
    use std::path::Path;
    use tempfile::TempDir;

    const REPORT: &str = r#"
tabs:
  a-ok:
    title: "Works"
    executable: sh
    arguments: ["-c", "echo ok"]
    gpstime: 1
  b-fail:
    executable: sh
    arguments: ["-c", "echo broken >&2; exit 2"]
    gpstime: 1
  c-missing:
    executable: /nonexistent/summary
    arguments: []
    gpstime: 1
"#;

    fn run_args(selection: TabSelection) -> RunArgs {
        RunArgs {
            selection,
            output_dir: None,
            record: None,
            jobs: 1,
            strict: false,
            format: OutputFormat::Silent,
        }
    }

    fn loaded(path: &Path) -> Vec<SubprocessTab> {
        load_tabs(&selection(path, &[], None)).unwrap()
    }

    #[test]
    fn test_process_tabs_sequential() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, REPORT);
        let mut tabs = loaded(&path);

        let durations = process_tabs(&mut tabs, 1).unwrap();
        assert_eq!(durations.len(), 3);

        // `sh -c "echo ok" 1`: the GPS time becomes $0 and is not printed.
        assert_eq!(tabs[0].body().as_deref(), Some("ok\n"));

        let failed = tabs[1].body().unwrap();
        assert!(failed.contains("Return code:\n2\n"));
        assert!(failed.contains("broken"));

        let missing = tabs[2].body().unwrap();
        assert!(missing.contains("could not start process"));
    }

    #[test]
    fn test_process_tabs_parallel_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, REPORT);
        let mut sequential = loaded(&path);
        let mut parallel = loaded(&path);

        process_tabs(&mut sequential, 1).unwrap();
        process_tabs(&mut parallel, 3).unwrap();

        let names: Vec<&str> = parallel.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["a-ok", "b-fail", "c-missing"]);
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.body(), p.body());
        }
    }

    #[test]
    fn test_process_tabs_parallel_does_not_wait_on_slow_neighbour() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
tabs:
  a-slow:
    executable: sleep
    arguments: []
    gpstime: 2
  b-quick:
    executable: sleep
    arguments: []
    gpstime: 1
  c-quick:
    executable: sleep
    arguments: []
    gpstime: 1
"#,
        );
        let mut tabs = loaded(&path);

        // Two workers: one takes a-slow while the other runs both quick tabs.
        let start = Instant::now();
        let durations = process_tabs(&mut tabs, 2).unwrap();
        assert!(start.elapsed() < Duration::from_millis(2800));

        assert!(tabs.iter().all(|t| t.result().is_some_and(|r| r.is_success())));
        assert!(durations[0] >= Duration::from_secs(2));
        assert!(durations[1] >= Duration::from_secs(1));
    }

    #[test]
    fn test_format_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, REPORT);
        let mut tabs = loaded(&path);
        process_tabs(&mut tabs, 1).unwrap();

        let text = format_text(&tabs);
        assert!(text.starts_with("==> a-ok (Works) <==\nok\n\n==> b-fail <==\n"));
    }

    #[test]
    fn test_format_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, REPORT);
        let mut tabs = loaded(&path);
        process_tabs(&mut tabs, 1).unwrap();

        let json: Value = serde_json::from_str(&format_json(&tabs).unwrap()).unwrap();
        assert_eq!(json[0]["tab"], "a-ok");
        assert_eq!(json[0]["status"], "success");
        assert_eq!(json[0]["exit_code"], 0);
        assert_eq!(json[0]["body"], "ok\n");
        assert_eq!(json[1]["status"], "failure");
        assert_eq!(json[1]["exit_code"], 2);
        assert!(json[2].get("exit_code").is_none());
    }

    #[test]
    fn test_cmd_run_writes_bodies_and_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, REPORT);
        let out_dir = temp_dir.path().join("bodies");
        let record = temp_dir.path().join("runs.ndjson");

        let mut args = run_args(selection(&path, &[], None));
        args.output_dir = Some(out_dir.clone());
        args.record = Some(record.clone());
        cmd_run(args).unwrap();

        let body = std::fs::read_to_string(out_dir.join("a-ok.txt")).unwrap();
        assert_eq!(body, "ok\n");
        assert!(out_dir.join("b-fail.txt").exists());
        assert!(out_dir.join("c-missing.txt").exists());

        let lines: Vec<Value> = std::fs::read_to_string(&record)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["outcome"], "success");
        assert_eq!(lines[1]["kind"], "exit");
        assert_eq!(lines[2]["kind"], "launch");
    }

    #[test]
    fn test_cmd_run_strict_reports_failures() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, REPORT);

        let mut args = run_args(selection(&path, &[], None));
        args.strict = true;
        let err = cmd_run(args).unwrap_err();
        assert!(matches!(
            err,
            TabError::TabFailures {
                failed: 2,
                total: 3
            }
        ));

        let mut args = run_args(selection(&path, &["a-ok"], None));
        args.strict = true;
        cmd_run(args).unwrap();
    }

    #[test]
    fn test_cmd_run_config_error_spawns_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let marker = temp_dir.path().join("ran");
        let yaml = format!(
            r#"
tabs:
  a:
    executable: touch
    arguments: ["{}"]
    gpstime: 1
  b:
    executable: touch
    arguments: []
    gpstime: 1
    states: [All, Science]
"#,
            marker.display()
        );
        let path = write_config(&temp_dir, &yaml);

        let err = cmd_run(run_args(selection(&path, &[], None))).unwrap_err();
        assert!(matches!(err, TabError::ConfigError(_)));
        assert!(!marker.exists());
    }
}
