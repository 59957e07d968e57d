//! Child process execution with timeout and output capture.
//!
//! The argument vector is passed straight to `std::process::Command`; no shell
//! is ever involved. Stdout and stderr are drained on reader threads so a child
//! that fills a pipe cannot block on its parent.
//!
//! The timeout bounds the whole run: waiting for the child to exit and
//! draining its pipes. On Unix the child leads its own process group, so a
//! background grandchild holding the pipes open is killed along with it.

use super::outcome::{ExecutionResult, Failure};
use crate::error::{Result, TabError};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Default timeout for a tab command, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

/// Longer timeouts are clamped so the deadline stays representable.
const MAX_TIMEOUT_SECONDS: u64 = 365 * 24 * 60 * 60;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to keep collecting output after a timed-out child is killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Executes a resolved argument vector exactly once.
///
/// Launch failures, non-zero exits and timeouts come back as
/// `ExecutionResult::Failure`. `Err` is reserved for faults in the runner
/// itself, which callers should propagate.
pub trait Runner: Sync {
    fn run(&self, argv: &[String]) -> Result<ExecutionResult>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl ProcessRunner {
    pub fn new(timeout_seconds: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_seconds.min(MAX_TIMEOUT_SECONDS)),
        }
    }

    fn timed_out(&self, argv: &[String], stderr: &PipeCapture) -> ExecutionResult {
        tracing::warn!(
            command = ?argv,
            timeout_secs = self.timeout.as_secs(),
            "tab command timed out and was killed"
        );
        ExecutionResult::Failure(Failure::timeout(
            argv,
            self.timeout.as_secs(),
            stderr.snapshot(),
        ))
    }
}

impl Runner for ProcessRunner {
    fn run(&self, argv: &[String]) -> Result<ExecutionResult> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            TabError::Internal("cannot run an empty argument vector".to_string())
        })?;

        tracing::debug!(command = ?argv, "spawning tab command");

        let start = Instant::now();
        let deadline = start + self.timeout;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "could not start tab command");
                return Ok(ExecutionResult::Failure(Failure::launch(argv, &e)));
            }
        };

        let (done_tx, done_rx) = mpsc::channel();
        let stdout = PipeCapture::spawn(child.stdout.take(), "stdout", done_tx.clone());
        let stderr = PipeCapture::spawn(child.stderr.take(), "stderr", done_tx);
        let open_pipes = usize::from(stdout.is_open()) + usize::from(stderr.is_open());

        let Some(status) = wait_until(&mut child, deadline)? else {
            let _ = wait_for_readers(&done_rx, open_pipes, Instant::now() + DRAIN_GRACE);
            return Ok(self.timed_out(argv, &stderr));
        };

        if !wait_for_readers(&done_rx, open_pipes, deadline)? {
            // The child exited but something it started still holds the pipes.
            tracing::debug!(command = ?argv, "pipes still open after exit");
            kill_group(&child);
            return Ok(self.timed_out(argv, &stderr));
        }

        let stdout = stdout.snapshot();
        let stderr = stderr.snapshot();
        let elapsed = start.elapsed();

        tracing::info!(
            program = %program,
            exit_code = ?status.code(),
            duration_ms = elapsed.as_millis() as u64,
            "tab command finished"
        );

        if status.success() {
            if !stderr.trim().is_empty() {
                tracing::debug!(stderr = %stderr.trim(), "tab command wrote to stderr");
            }
            return Ok(ExecutionResult::Success { output: stdout });
        }

        let fallback = describe_status(&status);
        tracing::warn!(command = ?argv, status = %fallback, "tab command failed");
        Ok(ExecutionResult::Failure(Failure::exit(
            argv,
            status.code(),
            stderr,
            fallback,
        )))
    }
}

/// Wait for a child process until `deadline`.
///
/// Returns `None` if the child (and its process group) was killed because the
/// deadline passed.
fn wait_until(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if Instant::now() >= deadline {
                    kill_process(child);
                    return Ok(None);
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_process(child);
                return Err(TabError::Internal(format!(
                    "failed to check process status: {}",
                    e
                )));
            }
        }
    }
}

/// Kill a process and everything in its group, then reap it.
fn kill_process(child: &mut Child) {
    kill_group(child);
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    // The group id outlives the leader while any member is still running.
    if let Ok(pgid) = i32::try_from(child.id())
        && let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL)
    {
        tracing::debug!(pgid, error = %e, "could not signal process group");
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

/// Wait until `pending` readers have reached end of file, or `deadline`.
///
/// Returns `false` if the deadline passed first.
fn wait_for_readers(
    done: &Receiver<std::io::Result<()>>,
    mut pending: usize,
    deadline: Instant,
) -> Result<bool> {
    while pending > 0 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match done.recv_timeout(remaining) {
            Ok(Ok(())) => pending -= 1,
            Ok(Err(e)) => {
                return Err(TabError::Internal(format!(
                    "failed to read child output: {}",
                    e
                )));
            }
            Err(RecvTimeoutError::Timeout) => return Ok(false),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(TabError::Internal(
                    "output reader thread exited without reporting".to_string(),
                ));
            }
        }
    }
    Ok(true)
}

/// Bytes read so far from one child pipe.
///
/// The reader thread appends as data arrives, so a snapshot taken after a
/// timeout still holds whatever the child wrote before it was killed.
struct PipeCapture {
    buf: Arc<Mutex<Vec<u8>>>,
    open: bool,
}

impl PipeCapture {
    fn spawn<R: Read + Send + 'static>(
        pipe: Option<R>,
        stream: &'static str,
        done: Sender<std::io::Result<()>>,
    ) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let Some(mut pipe) = pipe else {
            return Self { buf, open: false };
        };

        let sink = Arc::clone(&buf);
        thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            let result = loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break Ok(()),
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        tracing::debug!(stream, error = %e, "child pipe read failed");
                        break Err(e);
                    }
                }
            };
            // The receiver is gone once the runner has given up on this child.
            let _ = done.send(result);
        });

        Self { buf, open: true }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn snapshot(&self) -> String {
        let bytes = self
            .buf
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn describe_status(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("process exited with status {}", code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("terminated by signal {}", signal);
        }
    }

    "process terminated abnormally".to_string()
}
