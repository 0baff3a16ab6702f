use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";
pub const DEFAULT_LEGACY_INDEX_URL: &str = "https://pypi.python.org";
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 900;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
    /// Answer every confirmation with yes and take preselected choices.
    pub assume_yes: bool,
    /// Workspace roots scanned for environments and sources. Empty means the
    /// current directory.
    pub workspaces: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.var(key).map(str::trim).filter(|value| !value.is_empty())
    }

    fn seconds(&self, key: &str, default: u64) -> Duration {
        let secs = match self.non_empty(key) {
            Some(raw) => raw.parse::<u64>().ok().filter(|secs| *secs > 0).unwrap_or_else(|| {
                tracing::warn!(key, value = raw, "ignoring invalid timeout");
                default
            }),
            None => default,
        };
        Duration::from_secs(secs)
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) state: StateConfig,
    pub(crate) network: NetworkConfig,
    pub(crate) timeouts: TimeoutConfig,
}

impl Config {
    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        let state_file = match snapshot.non_empty("VENVX_STATE_FILE") {
            Some(path) => PathBuf::from(path),
            None => dirs_next::home_dir()
                .map(|home| home.join(".venvx").join("state.json"))
                .ok_or_else(|| {
                    anyhow!("cannot determine the home directory; set VENVX_STATE_FILE")
                })?,
        };
        Ok(Self {
            state: StateConfig { file: state_file },
            network: NetworkConfig {
                online: match snapshot.var("VENVX_ONLINE") {
                    Some(value) => {
                        let lowered = value.to_ascii_lowercase();
                        !matches!(lowered.as_str(), "0" | "false" | "no" | "off" | "")
                    }
                    None => true,
                },
                index_url: snapshot
                    .non_empty("VENVX_INDEX_URL")
                    .unwrap_or(DEFAULT_INDEX_URL)
                    .trim_end_matches('/')
                    .to_string(),
                legacy_index_url: snapshot
                    .non_empty("VENVX_LEGACY_INDEX_URL")
                    .unwrap_or(DEFAULT_LEGACY_INDEX_URL)
                    .trim_end_matches('/')
                    .to_string(),
                http_timeout: snapshot.seconds("VENVX_HTTP_TIMEOUT", DEFAULT_HTTP_TIMEOUT_SECS),
                keep_proxies: crate::core::net::keep_proxies(snapshot),
            },
            timeouts: TimeoutConfig {
                probe: snapshot.seconds("VENVX_PROBE_TIMEOUT", DEFAULT_PROBE_TIMEOUT_SECS),
                command: snapshot.seconds("VENVX_COMMAND_TIMEOUT", DEFAULT_COMMAND_TIMEOUT_SECS),
            },
        })
    }

    #[must_use]
    pub fn state(&self) -> &StateConfig {
        &self.state
    }

    #[must_use]
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    #[must_use]
    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }
}

#[derive(Debug, Clone)]
pub struct StateConfig {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub online: bool,
    pub index_url: String,
    pub legacy_index_url: String,
    pub http_timeout: Duration,
    pub keep_proxies: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            online: true,
            index_url: DEFAULT_INDEX_URL.to_string(),
            legacy_index_url: DEFAULT_LEGACY_INDEX_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            keep_proxies: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimeoutConfig {
    pub probe: Duration,
    pub command: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            command: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let mut all = vec![("VENVX_STATE_FILE", "/tmp/venvx-state.json")];
        all.extend_from_slice(pairs);
        Config::from_snapshot(&EnvSnapshot::testing(&all)).unwrap()
    }

    #[test]
    fn venvx_online_handles_common_falsey_values() {
        assert!(!config(&[("VENVX_ONLINE", "no")]).network().online);
        assert!(!config(&[("VENVX_ONLINE", "off")]).network().online);
        assert!(!config(&[("VENVX_ONLINE", "")]).network().online);
        assert!(config(&[("VENVX_ONLINE", "1")]).network().online);
        assert!(config(&[]).network().online);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = config(&[]);
        assert_eq!(config.network().index_url, DEFAULT_INDEX_URL);
        assert_eq!(config.network().legacy_index_url, DEFAULT_LEGACY_INDEX_URL);
        assert_eq!(config.network().http_timeout, Duration::from_secs(15));
        assert_eq!(config.timeouts().probe, Duration::from_secs(5));
        assert_eq!(config.timeouts().command, Duration::from_secs(900));
        assert_eq!(config.state().file, PathBuf::from("/tmp/venvx-state.json"));
    }

    #[test]
    fn overrides_are_trimmed_and_validated() {
        let config = config(&[
            ("VENVX_INDEX_URL", "http://127.0.0.1:9000/"),
            ("VENVX_PROBE_TIMEOUT", "2"),
            ("VENVX_COMMAND_TIMEOUT", "soon"),
        ]);
        assert_eq!(config.network().index_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeouts().probe, Duration::from_secs(2));
        assert_eq!(config.timeouts().command, Duration::from_secs(900));
    }
}
