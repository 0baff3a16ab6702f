use serde_json::json;

use crate::ExecutionOutcome;

pub(crate) fn no_active_environment_outcome() -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        "no active environment",
        json!({
            "reason": "no_active_env",
            "hint": "run `venvx env activate <NAME|PATH>` first (see `venvx env list`)",
        }),
    )
}

pub(crate) fn missing_interpreter_outcome(env_path: &str) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        "no Python executable found in the environment",
        json!({
            "reason": "missing_interpreter",
            "env": env_path,
            "hint": "recreate the environment or activate another one",
        }),
    )
}

pub(crate) fn cancelled_outcome(what: &str) -> ExecutionOutcome {
    ExecutionOutcome::success(format!("{what} cancelled"), json!({ "cancelled": true }))
}

pub(crate) fn unknown_environment_outcome(target: &str) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        format!("no environment named or located at {target}"),
        json!({
            "reason": "unknown_env",
            "target": target,
            "hint": "run `venvx env list` to see known environments",
        }),
    )
}

pub(crate) fn ambiguous_environment_outcome(target: &str, paths: &[&str]) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        format!("{} environments are named {target}", paths.len()),
        json!({
            "reason": "ambiguous_env",
            "target": target,
            "matches": paths,
            "hint": "pass the environment path instead of its name",
        }),
    )
}
