use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use venvx_domain::ProjectMetadata;

use super::process::{run_command, CommandSpec, RunOutput};
use crate::core::config::NetworkConfig;
use crate::core::index;
use crate::core::tooling::prompt::{Prompter, TerminalPrompter};

pub trait PythonRuntime: Send + Sync {
    fn run(&self, spec: &CommandSpec<'_>) -> Result<RunOutput>;
    /// Resolves a program name on `PATH`.
    fn find_executable(&self, name: &str) -> Option<PathBuf>;
}

pub trait FileSystem: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

pub trait PackageIndex: Send + Sync {
    /// Project metadata, or `None` when the index does not know the name.
    fn project(&self, network: &NetworkConfig, name: &str) -> Result<Option<ProjectMetadata>>;
    /// Project names matching `query`, scraped from the search pages.
    fn search_names(&self, network: &NetworkConfig, query: &str) -> Result<Vec<String>>;
}

pub trait Effects: Send + Sync {
    fn python(&self) -> &dyn PythonRuntime;
    fn fs(&self) -> &dyn FileSystem;
    fn index(&self) -> &dyn PackageIndex;
    fn prompter(&self) -> &dyn Prompter;
}

pub struct SystemEffects {
    python: Arc<SystemPythonRuntime>,
    fs: Arc<SystemFileSystem>,
    index: Arc<SystemPackageIndex>,
    prompter: Arc<TerminalPrompter>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        Self {
            python: Arc::new(SystemPythonRuntime),
            fs: Arc::new(SystemFileSystem),
            index: Arc::new(SystemPackageIndex::default()),
            prompter: Arc::new(TerminalPrompter),
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn python(&self) -> &dyn PythonRuntime {
        self.python.as_ref()
    }

    fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn index(&self) -> &dyn PackageIndex {
        self.index.as_ref()
    }

    fn prompter(&self) -> &dyn Prompter {
        self.prompter.as_ref()
    }
}

struct SystemPythonRuntime;

impl PythonRuntime for SystemPythonRuntime {
    fn run(&self, spec: &CommandSpec<'_>) -> Result<RunOutput> {
        run_command(spec)
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

struct SystemFileSystem;

impl FileSystem for SystemFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).with_context(|| format!("creating {}", path.display()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path).with_context(|| format!("removing dir {}", path.display()))
    }
}

/// Index access over one HTTP client, built on the first online lookup and
/// shared by every later request in the process.
#[derive(Default)]
struct SystemPackageIndex {
    client: OnceCell<Client>,
}

impl SystemPackageIndex {
    fn client(&self, network: &NetworkConfig) -> Result<&Client> {
        self.client
            .get_or_try_init(|| crate::core::net::build_http_client(network))
    }
}

impl PackageIndex for SystemPackageIndex {
    fn project(&self, network: &NetworkConfig, name: &str) -> Result<Option<ProjectMetadata>> {
        if !network.online {
            tracing::debug!(name, "offline; skipping index lookup");
            return Ok(None);
        }
        let client = self.client(network)?;
        Ok(index::fetch_project(client, &network.index_url, name))
    }

    fn search_names(&self, network: &NetworkConfig, query: &str) -> Result<Vec<String>> {
        if !network.online {
            tracing::debug!(query, "offline; skipping index search");
            return Ok(Vec::new());
        }
        let client = self.client(network)?;
        let (base, legacy) = (&network.index_url, &network.legacy_index_url);
        Ok(index::search_names(client, base, legacy, query))
    }
}

pub type SharedEffects = Arc<dyn Effects>;
