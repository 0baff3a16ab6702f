use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::runtime::process::RunOutput;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }

    /// Failure for an external tool that ran but exited non-zero.
    pub fn tool_failure(message: impl Into<String>, output: &RunOutput, extra: Value) -> Self {
        let mut details = json!({
            "reason": "tool_failed",
            "code": output.code,
            "stdout": output.stdout,
            "stderr": output.stderr,
        });
        merge_details(&mut details, extra);
        Self::failure(message, details)
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Ok
    }
}

/// Copies the keys of `extra` into `details`, overwriting on conflict.
pub(crate) fn merge_details(details: &mut Value, extra: Value) {
    match (details.as_object_mut(), extra) {
        (Some(map), Value::Object(extra)) => {
            for (key, value) in extra {
                map.insert(key, value);
            }
        }
        (_, Value::Null) => {}
        (Some(map), other) => {
            map.insert("extra".to_string(), other);
        }
        (None, _) => {}
    }
}

/// A condition the user can fix: missing environment, unknown package, etc.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct UserFacingError {
    pub(crate) message: String,
    pub(crate) details: Value,
}

impl UserFacingError {
    pub fn new(message: impl Into<String>, details: Value) -> Self {
        Self {
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn details(&self) -> &Value {
        &self.details
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}
