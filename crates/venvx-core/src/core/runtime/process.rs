use std::{
    io::Read,
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};

const DEFAULT_MAX_CAPTURE_BYTES: usize = 1024 * 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn max_capture_bytes() -> usize {
    std::env::var("VENVX_MAX_CAPTURE_BYTES")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_CAPTURE_BYTES)
}

#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{program} did not finish within {}s", timeout.as_secs())]
pub struct ProcessTimeout {
    pub program: String,
    pub timeout: Duration,
}

/// An external tool ran but exited non-zero.
#[derive(thiserror::Error, Debug)]
#[error("{action} exited with code {}", output.code)]
pub struct ToolFailure {
    pub action: String,
    pub output: RunOutput,
}

/// Turns a non-zero exit into a [`ToolFailure`].
///
/// # Errors
///
/// Returns [`ToolFailure`] when `output.code` is not zero.
pub fn ensure_success(action: impl Into<String>, output: RunOutput) -> Result<RunOutput> {
    if output.success() {
        Ok(output)
    } else {
        Err(ToolFailure {
            action: action.into(),
            output,
        }
        .into())
    }
}

/// A single external invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec<'a> {
    pub program: &'a str,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub cwd: Option<&'a Path>,
    pub timeout: Duration,
}

impl<'a> CommandSpec<'a> {
    pub fn new<I, S>(program: &'a str, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program,
            args: args.into_iter().map(Into::into).collect(),
            envs: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    #[must_use]
    pub fn cwd(mut self, cwd: &'a Path) -> Self {
        self.cwd = Some(cwd);
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string()];
        parts.extend(self.args.iter().map(|arg| {
            if arg.contains(char::is_whitespace) {
                format!("{arg:?}")
            } else {
                arg.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Execute a program, capture stdout/stderr, and kill it once the timeout
/// elapses.
///
/// A non-zero exit is reported through [`RunOutput::code`], not as an error.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned, its streams cannot be
/// read, or it outlives the timeout ([`ProcessTimeout`]).
pub fn run_command(spec: &CommandSpec<'_>) -> Result<RunOutput> {
    let program = spec.program;
    let mut command = Command::new(program);
    command.args(&spec.args);
    for (key, value) in &spec.envs {
        command.env(key, value);
    }
    if let Some(cwd) = spec.cwd {
        command.current_dir(cwd);
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    tracing::debug!(command = %spec.display(), timeout_secs = spec.timeout.as_secs(), "running");
    let mut child = command
        .spawn()
        .with_context(|| format!("failed to start {program}"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("stdout missing for {program}"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow::anyhow!("stderr missing for {program}"))?;
    let limit = max_capture_bytes();
    let stdout_handle = thread::spawn(move || read_to_string_limited(stdout, limit));
    let stderr_handle = thread::spawn(move || read_to_string_limited(stderr, limit));

    let Some(status) = wait_with_timeout(&mut child, spec.timeout)
        .with_context(|| format!("failed to wait for {program}"))?
    else {
        let _ = child.kill();
        let _ = child.wait();
        // Grandchildren may still hold the pipes open; leave the readers
        // detached instead of joining them.
        drop((stdout_handle, stderr_handle));
        tracing::debug!(program, "killed after timeout");
        return Err(ProcessTimeout {
            program: program.to_string(),
            timeout: spec.timeout,
        }
        .into());
    };
    let code = status.code().unwrap_or(-1);
    let (mut stdout, stdout_truncated) = stdout_handle
        .join()
        .map_err(|_| anyhow::anyhow!("stdout thread panicked"))??;
    let (mut stderr, stderr_truncated) = stderr_handle
        .join()
        .map_err(|_| anyhow::anyhow!("stderr thread panicked"))??;
    if stdout_truncated {
        stdout.push_str("\n[...truncated...]\n");
    }
    if stderr_truncated {
        stderr.push_str("\n[...truncated...]\n");
    }
    tracing::debug!(program, code, "finished");
    Ok(RunOutput {
        code,
        stdout,
        stderr,
    })
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_to_string_limited(mut reader: impl Read, limit: usize) -> Result<(String, bool)> {
    let mut buffer = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; 8192];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        append_limited(&mut buffer, &chunk[..read], limit, &mut truncated);
    }
    Ok((String::from_utf8_lossy(&buffer).to_string(), truncated))
}

/// Keeps the newest `limit` bytes.
fn append_limited(buffer: &mut Vec<u8>, chunk: &[u8], limit: usize, truncated: &mut bool) {
    if limit == 0 {
        return;
    }
    if buffer.len().saturating_add(chunk.len()) <= limit {
        buffer.extend_from_slice(chunk);
        return;
    }
    *truncated = true;
    let old_len = buffer.len();
    let excess = old_len.saturating_add(chunk.len()).saturating_sub(limit);
    if excess >= old_len {
        buffer.clear();
        let drop_from_chunk = excess.saturating_sub(old_len).min(chunk.len());
        buffer.extend_from_slice(&chunk[drop_from_chunk..]);
    } else {
        buffer.drain(0..excess);
        buffer.extend_from_slice(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn sh(script: &str, timeout: Duration) -> CommandSpec<'static> {
        CommandSpec::new("/bin/sh", ["-c".to_string(), script.to_string()], timeout)
    }

    #[cfg(unix)]
    #[test]
    fn run_command_captures_output_and_status_unix() -> Result<()> {
        let output = run_command(&sh(
            "printf out && printf err >&2; exit 7",
            Duration::from_secs(10),
        ))?;
        assert_eq!(output.code, 7);
        assert!(!output.success());
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_command_kills_on_timeout_unix() {
        let started = Instant::now();
        let err = run_command(&sh("sleep 5", Duration::from_millis(200))).unwrap_err();
        assert!(err.downcast_ref::<ProcessTimeout>().is_some(), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn run_command_passes_env_and_cwd_unix() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let spec = sh("printf \"$VENVX_TEST_VALUE:\" && pwd", Duration::from_secs(10))
            .env("VENVX_TEST_VALUE", "42")
            .cwd(dir.path());
        let output = run_command(&spec)?;
        let expected = dir.path().canonicalize()?;
        let (value, cwd) = output.stdout.trim().split_once(':').unwrap();
        assert_eq!(value, "42");
        assert_eq!(Path::new(cwd).canonicalize()?, expected);
        Ok(())
    }

    #[test]
    fn missing_program_is_an_error() {
        let spec = CommandSpec::new(
            "venvx-definitely-missing-binary",
            Vec::<String>::new(),
            Duration::from_secs(1),
        );
        assert!(run_command(&spec).is_err());
    }

    #[test]
    fn append_limited_keeps_the_tail() {
        let mut buffer = b"abcd".to_vec();
        let mut truncated = false;
        append_limited(&mut buffer, b"ef", 4, &mut truncated);
        assert!(truncated);
        assert_eq!(buffer, b"cdef");
    }
}
