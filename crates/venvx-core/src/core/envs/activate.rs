use std::env;
use std::ffi::OsString;
use std::path::Path;

use anyhow::Result;
use serde_json::json;
use venvx_domain::{canonical_path, find_environment, merge_environments, EnvLookup};

use super::discover::{known_environments, listing_details};
use crate::core::python::{executables_dir, find_interpreter};
use crate::core::tooling::ambiguous_environment_outcome;
use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug)]
pub struct EnvActivateRequest {
    /// Environment name or path.
    pub target: String,
}

#[derive(Clone, Debug, Default)]
pub struct EnvDeactivateRequest;

/// Marks an environment as active.
///
/// Known names and paths resolve against the merged listing; anything else is
/// stored as a path without further checks. A name shared by several
/// environments is rejected.
///
/// # Errors
/// Returns an error if state cannot be read or written.
pub fn env_activate(
    ctx: &CommandContext,
    request: &EnvActivateRequest,
) -> Result<ExecutionOutcome> {
    let envs = known_environments(ctx)?;
    let (path, name) = match find_environment(&envs, &request.target) {
        EnvLookup::Found(env) => (env.path.clone(), env.name.clone()),
        EnvLookup::Ambiguous(matches) => {
            let paths: Vec<&str> = matches.iter().map(|env| env.path.as_str()).collect();
            return Ok(ambiguous_environment_outcome(&request.target, &paths));
        }
        EnvLookup::Missing => {
            tracing::debug!(target = %request.target, "activating an unlisted path");
            let path = canonical_path(&request.target);
            let name = Path::new(&path)
                .file_name()
                .map_or_else(|| path.clone(), |name| name.to_string_lossy().to_string());
            (path, name)
        }
    };
    ctx.state().set_active(&path)?;
    let env_dir = Path::new(&path);
    let interpreter = find_interpreter(env_dir).map(|python| python.display().to_string());
    let refreshed = merge_environments(&envs, &[], Some(path.as_str()));
    let mut details = listing_details(&refreshed);
    details["path"] = json!(path);
    details["name"] = json!(name);
    details["interpreter"] = json!(interpreter);
    details["env"] = activation_vars(env_dir);
    let message = format!("activated {name}");
    Ok(ExecutionOutcome::success(message, details))
}

/// `VIRTUAL_ENV` and a `PATH` with the environment's executables first.
fn activation_vars(env_dir: &Path) -> serde_json::Value {
    let bin = executables_dir(env_dir);
    let mut entries: Vec<_> = vec![bin.clone()];
    if let Some(existing) = env::var_os("PATH") {
        entries.extend(env::split_paths(&existing).filter(|entry| *entry != bin));
    }
    let path = env::join_paths(entries)
        .unwrap_or_else(|_| OsString::from(bin.as_os_str()))
        .to_string_lossy()
        .to_string();
    json!({
        "VIRTUAL_ENV": env_dir.display().to_string(),
        "PATH": path,
    })
}

/// Clears the active environment.
///
/// # Errors
/// Returns an error if state cannot be written.
pub fn env_deactivate(
    ctx: &CommandContext,
    _request: &EnvDeactivateRequest,
) -> Result<ExecutionOutcome> {
    let state = ctx.state();
    let previous = state.active_path()?;
    state.clear_active()?;
    let message = match &previous {
        Some(path) => format!("deactivated {path}"),
        None => "no environment was active".to_string(),
    };
    let mut details = listing_details(&known_environments(ctx)?);
    details["previous"] = json!(previous);
    Ok(ExecutionOutcome::success(message, details))
}
