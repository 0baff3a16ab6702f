use anyhow::Result;
use serde_json::{json, Value};
use venvx_domain::{
    dedupe_by_path, environments_view, filter_environments, merge_environments, Environment,
    CANDIDATE_DIRS,
};

use crate::core::python::probe_environment;
use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug, Default)]
pub struct EnvListRequest {
    /// Case-insensitive substring matched against name, kind, version and path.
    pub filter: Option<String>,
}

/// Probes the conventional environment directories of every workspace root.
pub(crate) fn scan_workspaces(ctx: &CommandContext) -> Vec<Environment> {
    let timeout = ctx.config().timeouts().probe;
    let mut found = Vec::new();
    for root in ctx.workspace_roots() {
        for candidate in CANDIDATE_DIRS {
            let dir = root.join(candidate);
            if let Some(env) = probe_environment(ctx.python_runtime(), &dir, None, timeout) {
                found.push(env);
            }
        }
    }
    dedupe_by_path(found)
}

/// Manual and detected environments merged, with the active flag applied.
pub(crate) fn known_environments(ctx: &CommandContext) -> Result<Vec<Environment>> {
    let state = ctx.state();
    let manual = state.manual_environments()?;
    let active = state.active_path()?;
    let detected = scan_workspaces(ctx);
    tracing::debug!(
        manual = manual.len(),
        detected = detected.len(),
        "merging environments"
    );
    Ok(merge_environments(&manual, &detected, active.as_deref()))
}

/// `environments`, `active` and the rendered `view` for a merged listing.
pub(crate) fn listing_details(envs: &[Environment]) -> Value {
    let active = envs.iter().find(|env| env.is_active).map(|env| env.path.clone());
    json!({
        "environments": envs,
        "active": active,
        "view": environments_view(envs),
    })
}

/// Lists known environments.
///
/// # Errors
/// Returns an error if persisted state cannot be read.
pub fn env_list(ctx: &CommandContext, request: &EnvListRequest) -> Result<ExecutionOutcome> {
    let envs = filter_environments(known_environments(ctx)?, request.filter.as_deref());
    let mut details = listing_details(&envs);
    details["filter"] = json!(request.filter);
    let message = match envs.len() {
        0 => "no environments found".to_string(),
        1 => "1 environment".to_string(),
        count => format!("{count} environments"),
    };
    Ok(ExecutionOutcome::success(message, details))
}
