//! Scripted effects for handler tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use venvx_domain::{MemoryStateStore, ProjectMetadata};

use crate::core::config::{Config, EnvSnapshot, GlobalOptions, NetworkConfig};
use crate::core::runtime::effects::{Effects, FileSystem, PackageIndex, PythonRuntime};
use crate::core::runtime::process::{CommandSpec, RunOutput};
use crate::core::tooling::prompt::{AutoPrompter, Prompter};
use crate::CommandContext;

type Responder = Box<dyn Fn(&str, &[String]) -> Result<RunOutput> + Send + Sync>;

pub(crate) fn ok(stdout: &str) -> Result<RunOutput> {
    Ok(RunOutput {
        code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

pub(crate) fn exit(code: i32, stderr: &str) -> Result<RunOutput> {
    Ok(RunOutput {
        code,
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}

/// Runtime that answers from a closure and records every invocation as
/// `program arg arg ...`.
pub(crate) struct FakeRuntime {
    responder: Responder,
    calls: Mutex<Vec<String>>,
    executables: HashMap<String, PathBuf>,
}

impl FakeRuntime {
    pub(crate) fn new(
        responder: impl Fn(&str, &[String]) -> Result<RunOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            executables: HashMap::new(),
        }
    }

    pub(crate) fn with_executable(mut self, name: &str, path: &str) -> Self {
        self.executables
            .insert(name.to_string(), PathBuf::from(path));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl PythonRuntime for FakeRuntime {
    fn run(&self, spec: &CommandSpec<'_>) -> Result<RunOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            let mut line = vec![spec.program.to_string()];
            line.extend(spec.args.iter().cloned());
            calls.push(line.join(" "));
        }
        (self.responder)(spec.program, &spec.args)
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        self.executables.get(name).cloned()
    }
}

#[derive(Default)]
pub(crate) struct FakeIndex {
    pub(crate) projects: HashMap<String, ProjectMetadata>,
    pub(crate) search: Vec<String>,
}

impl FakeIndex {
    pub(crate) fn with_project(mut self, name: &str, latest: &str, releases: &[&str]) -> Self {
        let releases: serde_json::Map<String, serde_json::Value> = releases
            .iter()
            .map(|version| ((*version).to_string(), serde_json::json!([])))
            .collect();
        let metadata: ProjectMetadata = serde_json::from_value(serde_json::json!({
            "info": {"name": name, "version": latest, "summary": format!("{name} summary")},
            "releases": releases,
        }))
        .unwrap_or_else(|err| panic!("bad fake metadata: {err}"));
        self.projects.insert(name.to_lowercase(), metadata);
        self
    }
}

impl PackageIndex for FakeIndex {
    fn project(&self, _network: &NetworkConfig, name: &str) -> Result<Option<ProjectMetadata>> {
        Ok(self.projects.get(&name.to_lowercase()).cloned())
    }

    fn search_names(&self, _network: &NetworkConfig, _query: &str) -> Result<Vec<String>> {
        Ok(self.search.clone())
    }
}

struct RealFs;

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|err| anyhow!("reading {}: {err}", path.display()))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|err| anyhow!("reading {}: {err}", path.display()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).map_err(|err| anyhow!("writing {}: {err}", path.display()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|err| anyhow!("creating {}: {err}", path.display()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).map_err(|err| anyhow!("removing {}: {err}", path.display()))
    }
}

pub(crate) struct FakeEffects {
    pub(crate) runtime: Arc<FakeRuntime>,
    index: FakeIndex,
    fs: RealFs,
}

impl FakeEffects {
    pub(crate) fn new(runtime: FakeRuntime, index: FakeIndex) -> Self {
        Self {
            runtime: Arc::new(runtime),
            index,
            fs: RealFs,
        }
    }
}

impl Effects for FakeEffects {
    fn python(&self) -> &dyn PythonRuntime {
        self.runtime.as_ref()
    }

    fn fs(&self) -> &dyn FileSystem {
        &self.fs
    }

    fn index(&self) -> &dyn PackageIndex {
        &self.index
    }

    fn prompter(&self) -> &dyn Prompter {
        &AutoPrompter
    }
}

pub(crate) fn global_for(roots: &[&Path]) -> GlobalOptions {
    GlobalOptions {
        assume_yes: true,
        workspaces: roots.iter().map(|root| root.to_path_buf()).collect(),
        ..GlobalOptions::default()
    }
}

pub(crate) fn test_config() -> Config {
    Config::from_snapshot(&EnvSnapshot::testing(&[(
        "VENVX_STATE_FILE",
        "/nonexistent/venvx-state.json",
    )]))
    .unwrap_or_else(|err| panic!("test config: {err}"))
}

/// Context over in-memory state and the given fakes.
pub(crate) fn context<'a>(
    global: &'a GlobalOptions,
    effects: Arc<FakeEffects>,
) -> CommandContext<'a> {
    CommandContext::with_parts(
        global,
        test_config(),
        effects,
        Box::new(MemoryStateStore::new()),
    )
}

/// Creates `<dir>/bin/python3` (or the Windows equivalent) so interpreter
/// lookup succeeds.
pub(crate) fn fake_env_dir(dir: &Path) -> PathBuf {
    let bin = crate::core::python::executables_dir(dir);
    fs::create_dir_all(&bin).unwrap_or_else(|err| panic!("mkdir: {err}"));
    let python = if cfg!(windows) {
        bin.join("python.exe")
    } else {
        bin.join("python3")
    };
    fs::write(&python, b"").unwrap_or_else(|err| panic!("touch python: {err}"));
    python
}
