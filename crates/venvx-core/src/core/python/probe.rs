use std::path::Path;
use std::time::Duration;

use venvx_domain::{canonical_path, Environment, EnvironmentKind};

use super::interpreter::{find_interpreter, python_version};
use crate::core::runtime::effects::PythonRuntime;

/// Builds a descriptor for `dir` when it holds an interpreter.
///
/// `None` means "not an environment" and is not an error. A version that
/// cannot be resolved becomes the unknown sentinel.
pub fn probe_environment(
    runtime: &dyn PythonRuntime,
    dir: &Path,
    kind: Option<EnvironmentKind>,
    timeout: Duration,
) -> Option<Environment> {
    let python = find_interpreter(dir)?;
    let version = python_version(runtime, &python, timeout);
    let path = canonical_path(&dir.to_string_lossy());
    tracing::debug!(path = %path, version = ?version, "environment probed");
    Some(Environment::new(path, kind.unwrap_or_default(), version))
}
