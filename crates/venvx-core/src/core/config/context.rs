use std::env;
use std::path::PathBuf;

use anyhow::Result;
use venvx_domain::{EnvState, StateStore};

use crate::core::config::{Config, EnvSnapshot, GlobalOptions};
use crate::core::runtime::effects::{self, SharedEffects};
use crate::core::state_store::JsonFileStateStore;
use crate::core::tooling::prompt::{AutoPrompter, Prompter};
use crate::CommandGroup;

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    effects: SharedEffects,
    state: Box<dyn StateStore>,
}

impl<'a> CommandContext<'a> {
    /// Creates a new command context with the provided global options.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be prepared.
    pub fn new(global: &'a GlobalOptions, effects: SharedEffects) -> Result<Self> {
        let config = Config::from_snapshot(&EnvSnapshot::capture())?;
        let state = Box::new(JsonFileStateStore::new(config.state().file.clone()));
        Ok(Self::with_parts(global, config, effects, state))
    }

    /// Assembles a context from explicit parts.
    pub fn with_parts(
        global: &'a GlobalOptions,
        config: Config,
        effects: SharedEffects,
        state: Box<dyn StateStore>,
    ) -> Self {
        Self {
            global,
            config,
            effects,
            state,
        }
    }

    pub fn fs(&self) -> &dyn effects::FileSystem {
        self.effects.fs()
    }

    pub fn python_runtime(&self) -> &dyn effects::PythonRuntime {
        self.effects.python()
    }

    pub fn index(&self) -> &dyn effects::PackageIndex {
        self.effects.index()
    }

    /// `--yes` swaps in a prompter that accepts every default.
    pub fn prompter(&self) -> &dyn Prompter {
        if self.global.assume_yes {
            &AutoPrompter
        } else {
            self.effects.prompter()
        }
    }

    pub fn state(&self) -> EnvState<'_> {
        let mut state = EnvState::new(self.state.as_ref());
        state.subscribe(|change| tracing::info!(?change, "state updated"));
        state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_online(&self) -> bool {
        self.config.network().online
    }

    /// Workspace roots in the order given, or the current directory.
    pub fn workspace_roots(&self) -> Vec<PathBuf> {
        if self.global.workspaces.is_empty() {
            vec![env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
        } else {
            self.global
                .workspaces
                .iter()
                .map(|root| {
                    PathBuf::from(venvx_domain::canonical_path(&root.to_string_lossy()))
                })
                .collect()
        }
    }

    /// First workspace root; default location for new environments and exports.
    pub fn primary_root(&self) -> PathBuf {
        self.workspace_roots()
            .into_iter()
            .next()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
