//! Persistent key/value state: the active-environment slot and the manual set.

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::environment::{canonical_path, Environment};

pub const ACTIVE_ENV_KEY: &str = "activeEnvPath";
pub const MANUAL_ENVS_KEY: &str = "manualEnvs";

/// Key/value store for JSON values.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Option<Value>) -> Result<()>;
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: RefCell<HashMap<String, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Option<Value>) -> Result<()> {
        let mut values = self.values.borrow_mut();
        match value {
            Some(value) => {
                values.insert(key.to_string(), value);
            }
            None => {
                values.remove(key);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateChange {
    ActiveChanged(Option<String>),
    ManualAdded(String),
    ManualRemoved(String),
}

type Listener<'a> = Box<dyn Fn(&StateChange) + 'a>;

/// Typed accessors over a [`StateStore`].
///
/// Every mutation is broadcast to subscribed listeners after it has been
/// written.
pub struct EnvState<'a> {
    store: &'a dyn StateStore,
    listeners: Vec<Listener<'a>>,
}

impl<'a> EnvState<'a> {
    pub fn new(store: &'a dyn StateStore) -> Self {
        Self {
            store,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&StateChange) + 'a) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&self, change: &StateChange) {
        tracing::debug!(?change, "state changed");
        for listener in &self.listeners {
            listener(change);
        }
    }

    pub fn active_path(&self) -> Result<Option<String>> {
        let value = self.store.get(ACTIVE_ENV_KEY)?;
        Ok(match value {
            Some(Value::String(path)) if !path.is_empty() => Some(path),
            _ => None,
        })
    }

    /// Stores `path` as the active environment without checking it exists.
    pub fn set_active(&self, path: &str) -> Result<()> {
        self.store
            .set(ACTIVE_ENV_KEY, Some(Value::String(path.to_string())))?;
        self.emit(&StateChange::ActiveChanged(Some(path.to_string())));
        Ok(())
    }

    pub fn clear_active(&self) -> Result<()> {
        self.store.set(ACTIVE_ENV_KEY, None)?;
        self.emit(&StateChange::ActiveChanged(None));
        Ok(())
    }

    /// Manual entries in insertion order. Undecodable state reads as empty.
    pub fn manual_environments(&self) -> Result<Vec<Environment>> {
        let Some(value) = self.store.get(MANUAL_ENVS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_value::<Vec<Environment>>(value) {
            Ok(envs) => Ok(envs),
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable manual environment list");
                Ok(Vec::new())
            }
        }
    }

    /// Appends `env` unless its canonical path is already registered.
    ///
    /// Returns whether anything was added.
    pub fn add_manual(&self, env: &Environment) -> Result<bool> {
        let mut envs = self.manual_environments()?;
        let key = env.canonical_path();
        if envs.iter().any(|existing| existing.canonical_path() == key) {
            return Ok(false);
        }
        let mut stored = env.clone();
        stored.is_active = false;
        envs.push(stored);
        self.write_manual(&envs)?;
        self.emit(&StateChange::ManualAdded(env.path.clone()));
        Ok(true)
    }

    pub fn remove_manual(&self, path: &str) -> Result<bool> {
        let mut envs = self.manual_environments()?;
        let key = canonical_path(path);
        let before = envs.len();
        envs.retain(|env| env.canonical_path() != key);
        if envs.len() == before {
            return Ok(false);
        }
        self.write_manual(&envs)?;
        self.emit(&StateChange::ManualRemoved(path.to_string()));
        Ok(true)
    }

    pub fn is_manual(&self, path: &str) -> Result<bool> {
        let key = canonical_path(path);
        Ok(self
            .manual_environments()?
            .iter()
            .any(|env| env.canonical_path() == key))
    }

    fn write_manual(&self, envs: &[Environment]) -> Result<()> {
        let value = serde_json::to_value(envs).context("failed to encode manual environments")?;
        self.store.set(MANUAL_ENVS_KEY, Some(value))
    }
}
