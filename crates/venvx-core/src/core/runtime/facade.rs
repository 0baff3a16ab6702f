use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::config::context::CommandInfo;
use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandGroup {
    Env,
    Pkg,
    Reqs,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandGroup::Env => "env",
            CommandGroup::Pkg => "pkg",
            CommandGroup::Reqs => "reqs",
        };
        f.write_str(name)
    }
}

#[must_use]
pub fn to_json_response(info: CommandInfo, outcome: &ExecutionOutcome, _code: i32) -> Value {
    let status = match outcome.status {
        CommandStatus::Ok => "ok",
        CommandStatus::UserError => "user-error",
        CommandStatus::Failure => "error",
    };
    let details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    json!({
        "status": status,
        "message": format_status_message(info, &outcome.message),
        "details": details,
    })
}

#[must_use]
pub fn format_status_message(info: CommandInfo, message: &str) -> String {
    let prefix = format!("venvx {} {}", info.group, info.name);
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}

/// Converts an error that escaped a handler into an outcome.
///
/// User-facing errors keep their message and details. Tool failures carry the
/// captured streams; timeouts and anything else carry the error chain.
#[must_use]
pub fn outcome_from_error(err: &anyhow::Error) -> ExecutionOutcome {
    if let Some(user) = err.downcast_ref::<crate::UserFacingError>() {
        return ExecutionOutcome::user_error(user.message().to_string(), user.details().clone());
    }
    if let Some(tool) = err.downcast_ref::<crate::ToolFailure>() {
        return ExecutionOutcome::tool_failure(
            err.to_string(),
            &tool.output,
            json!({ "action": tool.action }),
        );
    }
    let issues: Vec<String> = err.chain().map(ToString::to_string).collect();
    let reason = if err.downcast_ref::<crate::ProcessTimeout>().is_some() {
        "timeout"
    } else {
        "internal_error"
    };
    ExecutionOutcome::failure(
        err.to_string(),
        json!({
            "reason": reason,
            "error": err.to_string(),
            "issues": issues,
            "hint": "Re-run with `-vv` for more detail.",
        }),
    )
}
