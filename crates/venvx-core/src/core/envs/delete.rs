use std::path::Path;

use anyhow::Result;
use serde_json::json;
use venvx_domain::{find_environment, EnvLookup};

use super::discover::known_environments;
use crate::core::tooling::{
    ambiguous_environment_outcome, cancelled_outcome, unknown_environment_outcome,
};
use crate::progress::ProgressReporter;
use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug)]
pub struct EnvDeleteRequest {
    pub target: String,
}

/// Removes an environment directory and forgets it.
///
/// The active environment cannot be deleted. A directory that fails to
/// disappear is logged and the manual entry is dropped regardless.
///
/// # Errors
/// Returns an error if state cannot be read or written.
pub fn env_delete(ctx: &CommandContext, request: &EnvDeleteRequest) -> Result<ExecutionOutcome> {
    let envs = known_environments(ctx)?;
    let env = match find_environment(&envs, &request.target) {
        EnvLookup::Found(env) => env,
        EnvLookup::Ambiguous(matches) => {
            let paths: Vec<&str> = matches.iter().map(|env| env.path.as_str()).collect();
            return Ok(ambiguous_environment_outcome(&request.target, &paths));
        }
        EnvLookup::Missing => return Ok(unknown_environment_outcome(&request.target)),
    };
    if env.is_active {
        return Ok(ExecutionOutcome::user_error(
            format!("{} is the active environment", env.name),
            json!({
                "reason": "env_active",
                "path": env.path,
                "hint": "run `venvx env deactivate` first",
            }),
        ));
    }
    let question = format!(
        "Delete environment \"{}\" at {}? This cannot be undone.",
        env.name, env.path
    );
    if !ctx.prompter().confirm(&question, false)? {
        return Ok(cancelled_outcome("delete"));
    }

    let spinner = ProgressReporter::spinner(format!("Removing {}", env.path));
    let removed = match ctx.fs().remove_dir_all(Path::new(&env.path)) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(path = %env.path, %err, "failed to remove environment directory");
            false
        }
    };
    drop(spinner);
    let state = ctx.state();
    let was_manual = state.is_manual(&env.path)? && state.remove_manual(&env.path)?;
    Ok(ExecutionOutcome::success(
        format!("deleted {}", env.name),
        json!({
            "path": env.path,
            "name": env.name,
            "removed_dir": removed,
            "unregistered": was_manual,
        }),
    ))
}
