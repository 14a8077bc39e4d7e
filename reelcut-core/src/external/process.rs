// ============================================================================
// reelcut-core/src/external/process.rs
// ============================================================================
//
// PROCESS EXECUTION: Subprocess runner with output capture and timeout
//
// All external tools (ffmpeg, yt-dlp) run through `run_command`. Both pipes
// are drained on background threads so a chatty child can never block on a
// full pipe, and the child is killed once the timeout elapses.
//
// AI-ASSISTANT-INFO: Shared subprocess runner for external tools

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};

// ---- External crate imports ----
use log::{debug, error, warn};

// ---- Standard library imports ----
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled while waiting with a timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long output readers may keep running after the child has exited.
/// Anything that still holds the pipes past this is abandoned.
const READER_GRACE: Duration = Duration::from_secs(2);

/// Number of trailing stderr lines kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr_lines: Vec<String>,
}

impl CommandOutput {
    /// Last few stderr lines joined, for error messages.
    pub fn stderr_tail(&self) -> String {
        let skip = self.stderr_lines.len().saturating_sub(STDERR_TAIL_LINES);
        self.stderr_lines[skip..].join("\n")
    }

    /// Converts a non-zero exit into `CommandFailed`.
    pub fn ensure_success(self, label: &str) -> CoreResult<Self> {
        if self.status.success() {
            Ok(self)
        } else {
            error!("{} failed with {}", label, self.status);
            Err(command_failed_error(label, self.status, self.stderr_tail()))
        }
    }
}

/// Runs `cmd` to completion, capturing stdout and stderr.
///
/// Stdin is closed. On Unix the child leads its own process group, so a
/// timeout kills everything it started (yt-dlp runs ffmpeg, for example)
/// and not just the direct child. With `timeout` set, `CommandTimeout` is
/// returned once the limit elapses. A non-zero exit is NOT an error here;
/// see [`CommandOutput::ensure_success`].
pub fn run_command(
    cmd: &mut Command,
    label: &str,
    timeout: Option<Duration>,
) -> CoreResult<CommandOutput> {
    debug!("Running {}: {:?}", label, cmd);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| command_start_error(label, e))?;

    let stdout_rx = child.stdout.take().map(|mut stdout| {
        spawn_reader(move || {
            let mut buf = String::new();
            let _ = stdout.read_to_string(&mut buf);
            buf
        })
    });
    let stderr_rx = child.stderr.take().map(|stderr| {
        spawn_reader(move || {
            BufReader::new(stderr)
                .lines()
                .map_while(Result::ok)
                .collect::<Vec<String>>()
        })
    });

    let status = match timeout {
        Some(limit) => wait_with_timeout(&mut child, label, limit),
        None => child.wait().map_err(|e| command_wait_error(label, e)),
    };

    // A surviving descendant can hold the pipes open indefinitely
    let deadline = Instant::now() + READER_GRACE;
    let stdout = collect_reader(stdout_rx, deadline, label);
    let stderr_lines = collect_reader(stderr_rx, deadline, label);

    Ok(CommandOutput {
        status: status?,
        stdout,
        stderr_lines,
    })
}

fn wait_with_timeout(child: &mut Child, label: &str, limit: Duration) -> CoreResult<ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if start.elapsed() >= limit => {
                warn!("{} exceeded {}s, killing it", label, limit.as_secs());
                kill_process_tree(child, label);
                let _ = child.wait();
                return Err(CoreError::CommandTimeout(label.to_string(), limit.as_secs()));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(command_wait_error(label, e)),
        }
    }
}

/// Kills the child's process group, then the child itself.
fn kill_process_tree(child: &mut Child, label: &str) {
    #[cfg(unix)]
    {
        // The group id equals the child's pid (see `process_group(0)`)
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match killed {
            Ok(status) if status.success() => debug!("Killed process group of {}", label),
            Ok(status) => debug!("kill for {} process group exited with {}", label, status),
            Err(e) => warn!("Failed to run kill for {}: {}", label, e),
        }
    }
    if let Err(e) = child.kill() {
        debug!("Failed to kill {}: {}", label, e);
    }
}

fn spawn_reader<T, F>(read: F) -> Receiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(read());
    });
    rx
}

fn collect_reader<T: Default>(rx: Option<Receiver<T>>, deadline: Instant, label: &str) -> T {
    let Some(rx) = rx else {
        return T::default();
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(value) => value,
        Err(_) => {
            warn!("Output of {} still open after exit; discarding the rest", label);
            T::default()
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_output_and_status() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err1 >&2; echo err2 >&2; exit 3"]);
        let output = run_command(&mut cmd, "sh", Some(Duration::from_secs(10))).unwrap();

        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr_lines, vec!["err1", "err2"]);
        assert!(matches!(
            output.ensure_success("sh"),
            Err(CoreError::CommandFailed { .. })
        ));
    }

    #[test]
    fn kills_child_after_timeout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 5"]);
        let started = Instant::now();
        let result = run_command(&mut cmd, "sleeper", Some(Duration::from_millis(200)));

        assert!(matches!(result, Err(CoreError::CommandTimeout(ref name, _)) if name == "sleeper"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn timeout_also_stops_grandchildren() {
        // `sleep` runs as a child of sh and inherits its output pipes
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 6; true"]);
        let started = Instant::now();
        let result = run_command(&mut cmd, "nested", Some(Duration::from_millis(300)));

        assert!(matches!(result, Err(CoreError::CommandTimeout(ref name, _)) if name == "nested"));
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
    }

    #[test]
    fn background_writer_does_not_hold_up_normal_exit() {
        // The child exits at once but leaves a descendant holding stdout
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo done; (sleep 6; echo late) &"]);
        let started = Instant::now();
        let output = run_command(&mut cmd, "detached", Some(Duration::from_secs(10))).unwrap();

        assert!(output.status.success());
        assert!(started.elapsed() < Duration::from_secs(4), "took {:?}", started.elapsed());
    }

    #[test]
    fn missing_binary_is_a_start_error() {
        let mut cmd = Command::new("definitely-not-a-real-binary-reelcut");
        assert!(matches!(
            run_command(&mut cmd, "missing", None),
            Err(CoreError::CommandStart(..))
        ));
    }
}
