use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::core::config::{EnvSnapshot, NetworkConfig};
use crate::VENVX_VERSION;

const PROXY_KEYS: &[&str] = &[
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
    "NO_PROXY",
    "no_proxy",
];

/// Decide whether venvx should honor standard proxy environment variables.
///
/// Behavior:
/// - `VENVX_KEEP_PROXIES=1/true/yes/on` forces proxies on.
/// - `VENVX_KEEP_PROXIES=0/false/no/off/""` forces proxies off.
/// - If unset, proxies are enabled only when at least one proxy env var is set.
pub(crate) fn keep_proxies(snapshot: &EnvSnapshot) -> bool {
    match snapshot.var("VENVX_KEEP_PROXIES") {
        Some(raw) => {
            let value = raw.trim().to_ascii_lowercase();
            !matches!(value.as_str(), "" | "0" | "false" | "no" | "off")
        }
        None => PROXY_KEYS.iter().any(|key| {
            snapshot
                .var(key)
                .is_some_and(|value| !value.trim().is_empty())
        }),
    }
}

pub(crate) fn build_http_client(network: &NetworkConfig) -> Result<Client> {
    let builder = Client::builder()
        .user_agent(format!("venvx/{VENVX_VERSION}"))
        .timeout(network.http_timeout);
    let builder = if network.keep_proxies {
        builder
    } else {
        builder.no_proxy()
    };
    builder.build().context("failed to build HTTP client")
}
