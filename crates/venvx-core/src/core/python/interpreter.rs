use std::path::{Path, PathBuf};
use std::time::Duration;

use venvx_domain::ExternalResult;

use crate::core::runtime::effects::PythonRuntime;
use crate::core::runtime::process::CommandSpec;

pub(crate) const VERSION_SCRIPT: &str = "import platform; print(platform.python_version())";

#[cfg(windows)]
const INTERPRETER_NAMES: [&str; 2] = ["python.exe", "python3.exe"];
#[cfg(not(windows))]
const INTERPRETER_NAMES: [&str; 2] = ["python3", "python"];

/// `bin` on Unix, `Scripts` on Windows.
pub fn executables_dir(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts")
    } else {
        env_dir.join("bin")
    }
}

/// First interpreter file found in the environment's executables directory.
pub fn find_interpreter(env_dir: &Path) -> Option<PathBuf> {
    if !env_dir.is_dir() {
        return None;
    }
    let bin = executables_dir(env_dir);
    INTERPRETER_NAMES
        .iter()
        .map(|name| bin.join(name))
        .find(|candidate| candidate.is_file())
}

/// Asks the interpreter for its version, falling back to the `--version`
/// banner when the script route fails.
pub fn probe_version(
    runtime: &dyn PythonRuntime,
    python: &Path,
    timeout: Duration,
) -> ExternalResult<String> {
    let program = python.to_string_lossy();
    script_version(runtime, &program, timeout)
        .or_else(|| banner_version(runtime, &program, timeout))
}

pub fn python_version(
    runtime: &dyn PythonRuntime,
    python: &Path,
    timeout: Duration,
) -> Option<String> {
    let result = probe_version(runtime, python, timeout);
    if let Some(reason) = result.failure_reason() {
        tracing::debug!(python = %python.display(), reason, "version probe failed");
    }
    result.into_option()
}

fn script_version(
    runtime: &dyn PythonRuntime,
    program: &str,
    timeout: Duration,
) -> ExternalResult<String> {
    let spec = CommandSpec::new(program, ["-c", VERSION_SCRIPT], timeout);
    match runtime.run(&spec) {
        Ok(output) if output.success() => {
            let version = output.stdout.trim();
            if version.is_empty() {
                ExternalResult::Empty
            } else {
                ExternalResult::Value(version.to_string())
            }
        }
        Ok(output) => ExternalResult::failed(format!("exit code {}", output.code)),
        Err(err) => ExternalResult::failed(err),
    }
}

fn banner_version(
    runtime: &dyn PythonRuntime,
    program: &str,
    timeout: Duration,
) -> ExternalResult<String> {
    let spec = CommandSpec::new(program, ["--version"], timeout);
    match runtime.run(&spec) {
        Ok(output) if output.success() => {
            let banner = if output.stdout.trim().is_empty() {
                &output.stderr
            } else {
                &output.stdout
            };
            ExternalResult::from_option(parse_version_banner(banner))
        }
        Ok(output) => ExternalResult::failed(format!("exit code {}", output.code)),
        Err(err) => ExternalResult::failed(err),
    }
}

/// Last whitespace-delimited token of a `Python X.Y.Z` banner.
pub(crate) fn parse_version_banner(banner: &str) -> Option<String> {
    banner
        .split_whitespace()
        .last()
        .map(ToString::to_string)
}
