//! `python -m pip` and friends, run inside a specific environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use venvx_domain::{parse_pip_list, ExternalResult, PackageRecord};

use super::interpreter::find_interpreter;
use crate::core::runtime::effects::PythonRuntime;
use crate::core::runtime::process::{ensure_success, CommandSpec, RunOutput};

/// Inverts `packages_distributions()` into `{distribution: [module, ...]}`.
pub(crate) const DISTRIBUTIONS_SCRIPT: &str = "\
import json
try:
    from importlib.metadata import packages_distributions
except ImportError:
    from importlib_metadata import packages_distributions
result = {}
for module, dists in packages_distributions().items():
    for dist in dists:
        result.setdefault(dist.lower(), []).append(module)
print(json.dumps(result))
";

pub struct Pip<'a> {
    runtime: &'a dyn PythonRuntime,
    python: PathBuf,
    timeout: Duration,
}

impl<'a> Pip<'a> {
    /// Pip for the environment rooted at `env_dir`, or `None` when it has no
    /// interpreter.
    pub fn for_environment(
        runtime: &'a dyn PythonRuntime,
        env_dir: &Path,
        timeout: Duration,
    ) -> Option<Self> {
        find_interpreter(env_dir).map(|python| Self::with_python(runtime, python, timeout))
    }

    pub fn with_python(runtime: &'a dyn PythonRuntime, python: PathBuf, timeout: Duration) -> Self {
        Self {
            runtime,
            python,
            timeout,
        }
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    fn run(&self, args: &[&str]) -> Result<RunOutput> {
        let program = self.python.to_string_lossy();
        let spec = CommandSpec::new(&program, args.iter().copied(), self.timeout)
            .env("PIP_DISABLE_PIP_VERSION_CHECK", "1");
        self.runtime.run(&spec)
    }

    fn pip(&self, args: &[&str]) -> Result<RunOutput> {
        let mut full = vec!["-m", "pip"];
        full.extend_from_slice(args);
        let output = self.run(&full)?;
        ensure_success(format!("pip {}", args.join(" ")), output)
    }

    /// Installed packages sorted by name.
    pub fn list(&self) -> Result<Vec<PackageRecord>> {
        let output = self.pip(&["list", "--format=json"])?;
        Ok(parse_pip_list(&output.stdout))
    }

    pub fn install(&self, spec: &str) -> Result<RunOutput> {
        self.pip(&["install", spec])
    }

    pub fn uninstall(&self, name: &str) -> Result<RunOutput> {
        self.pip(&["uninstall", "-y", name])
    }

    pub fn upgrade(&self, name: &str) -> Result<RunOutput> {
        self.pip(&["install", "--upgrade", name])
    }

    pub fn install_requirements(&self, file: &Path) -> Result<RunOutput> {
        let file = file.to_string_lossy();
        self.pip(&["install", "-r", &file])
    }

    pub fn freeze(&self) -> Result<String> {
        Ok(self.pip(&["freeze"])?.stdout)
    }

    /// Lower-cased distribution names mapped to the top-level modules they
    /// provide.
    pub fn distributions(&self) -> ExternalResult<BTreeMap<String, Vec<String>>> {
        let output = match self.run(&["-c", DISTRIBUTIONS_SCRIPT]) {
            Ok(output) if output.success() => output,
            Ok(output) => {
                return ExternalResult::failed(format!(
                    "distribution query exited with code {}",
                    output.code
                ))
            }
            Err(err) => return ExternalResult::failed(err),
        };
        parse_distributions(&output.stdout)
    }
}

fn parse_distributions(stdout: &str) -> ExternalResult<BTreeMap<String, Vec<String>>> {
    let parsed: BTreeMap<String, Vec<String>> = match serde_json::from_str(stdout.trim()) {
        Ok(parsed) => parsed,
        Err(err) => return ExternalResult::failed(err),
    };
    if parsed.is_empty() {
        return ExternalResult::Empty;
    }
    let mut mapping: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (dist, modules) in parsed {
        mapping.entry(dist.to_lowercase()).or_default().extend(modules);
    }
    for modules in mapping.values_mut() {
        modules.sort();
        modules.dedup();
    }
    ExternalResult::Value(mapping)
}

/// Creates a stdlib `venv` at `target` using `python`.
pub fn create_venv(
    runtime: &dyn PythonRuntime,
    python: &str,
    target: &Path,
    timeout: Duration,
) -> Result<RunOutput> {
    let target_arg = target.to_string_lossy();
    let spec = CommandSpec::new(python, ["-m", "venv", target_arg.as_ref()], timeout);
    let output = runtime.run(&spec)?;
    ensure_success(format!("{python} -m venv {target_arg}"), output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{exit, ok, FakeRuntime};
    use crate::ToolFailure;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn pip(runtime: &FakeRuntime) -> Pip<'_> {
        Pip::with_python(runtime, PathBuf::from("/env/bin/python3"), TIMEOUT)
    }

    #[test]
    fn list_parses_and_sorts() {
        let runtime = FakeRuntime::new(|_, _| {
            ok(r#"[{"name":"zlib","version":"1.0"},{"name":"attrs","version":"2.0"}]"#)
        });
        let names: Vec<String> = pip(&runtime)
            .list()
            .unwrap()
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, vec!["attrs", "zlib"]);
        assert_eq!(
            runtime.calls(),
            vec!["/env/bin/python3 -m pip list --format=json"]
        );
    }

    #[test]
    fn malformed_list_is_empty() {
        let runtime = FakeRuntime::new(|_, _| ok("{not json"));
        assert!(pip(&runtime).list().unwrap().is_empty());
    }

    #[test]
    fn non_zero_exit_is_a_tool_failure() {
        let runtime = FakeRuntime::new(|_, _| exit(1, "ERROR: not installed"));
        let err = pip(&runtime).uninstall("attrs").unwrap_err();
        let failure = err.downcast_ref::<ToolFailure>().expect("tool failure");
        assert_eq!(failure.action, "pip uninstall -y attrs");
        assert_eq!(failure.output.stderr, "ERROR: not installed");
    }

    #[test]
    fn distributions_are_lowercased_and_sorted() {
        let runtime =
            FakeRuntime::new(|_, _| {
                ok(r#"{"PyYAML": ["yaml", "_yaml"], "requests": ["requests"]}"#)
            });
        let mapping = pip(&runtime).distributions().into_option().unwrap();
        assert_eq!(mapping["pyyaml"], vec!["_yaml", "yaml"]);
        assert_eq!(mapping["requests"], vec!["requests"]);
    }

    #[test]
    fn distribution_query_failures_are_tagged() {
        let runtime = FakeRuntime::new(|_, _| exit(1, "ModuleNotFoundError"));
        assert!(pip(&runtime).distributions().failure_reason().is_some());
        let runtime = FakeRuntime::new(|_, _| ok("{}"));
        assert_eq!(pip(&runtime).distributions(), ExternalResult::Empty);
    }

    #[test]
    fn create_venv_runs_the_venv_module() {
        let runtime = FakeRuntime::new(|_, _| ok(""));
        create_venv(&runtime, "python3", Path::new("/work/.venv"), TIMEOUT).unwrap();
        assert_eq!(runtime.calls(), vec!["python3 -m venv /work/.venv"]);
    }
}
