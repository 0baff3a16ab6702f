use venvx_core::api as venvx_core;
use venvx_core::{diag_commands, CommandGroup, CommandInfo};
use serde_json::Value;

use super::details::hint_from_details;

pub(super) fn error_code(info: CommandInfo) -> &'static str {
    match (info.group, info.name) {
        (CommandGroup::Env, "list") => diag_commands::ENV_LIST,
        (CommandGroup::Env, "create") => diag_commands::ENV_CREATE,
        (CommandGroup::Env, "add") => diag_commands::ENV_ADD,
        (CommandGroup::Env, "activate" | "deactivate") => diag_commands::ENV_ACTIVATE,
        (CommandGroup::Env, "delete") => diag_commands::ENV_DELETE,
        (CommandGroup::Pkg, "list") => diag_commands::PKG_LIST,
        (CommandGroup::Pkg, "install") => diag_commands::PKG_INSTALL,
        (CommandGroup::Pkg, "uninstall") => diag_commands::PKG_UNINSTALL,
        (CommandGroup::Pkg, "update" | "update-all") => diag_commands::PKG_UPDATE,
        (CommandGroup::Pkg, "unused") => diag_commands::PKG_UNUSED,
        (CommandGroup::Pkg, "search") => diag_commands::PKG_SEARCH,
        (CommandGroup::Reqs, _) => diag_commands::REQS,
        _ => diag_commands::GENERIC,
    }
}

pub(super) fn collect_why_bullets(details: &Value, fallback: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(reason) = details.get("reason").and_then(Value::as_str) {
        push_unique(
            &mut bullets,
            reason_display(reason).unwrap_or(reason).to_string(),
        );
    }
    if let Some(tool) = details.get("tool").and_then(Value::as_str) {
        push_unique(&mut bullets, format!("`{tool}` was not found on PATH"));
    }
    if let Some(action) = details.get("action").and_then(Value::as_str) {
        let code = details.get("code").and_then(Value::as_i64).unwrap_or(-1);
        push_unique(&mut bullets, format!("`{action}` exited with code {code}"));
    }
    if let Some(matches) = details.get("matches").and_then(Value::as_array) {
        for path in matches.iter().filter_map(Value::as_str) {
            push_unique(&mut bullets, format!("matches {path}"));
        }
    }
    if let Some(issues) = details.get("issues").and_then(Value::as_array) {
        for message in issues.iter().filter_map(Value::as_str) {
            push_unique(&mut bullets, message);
        }
    }
    if bullets.is_empty() {
        bullets.push(fallback.to_string());
    }
    bullets
}

pub(super) fn collect_fix_bullets(details: &Value) -> Vec<String> {
    let mut fixes = Vec::new();
    if let Some(hint) = hint_from_details(details) {
        push_unique(&mut fixes, hint.to_string());
    }
    if let Some(skipped) = details.get("skipped").and_then(Value::as_array) {
        if !skipped.is_empty() {
            push_unique(
                &mut fixes,
                format!(
                    "Run `venvx pkg update-all` again once the failure is fixed ({} skipped)",
                    skipped.len()
                ),
            );
        }
    }
    if fixes.is_empty() {
        fixes.push("Re-run with --help for usage or inspect the output above.".to_string());
    }
    fixes
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}

fn reason_display(code: &str) -> Option<&'static str> {
    match code {
        "no_active_env" => Some("No environment is active."),
        "missing_interpreter" => Some("The active environment has no Python executable."),
        "unknown_env" => Some("No known environment matches that name or path."),
        "ambiguous_env" => Some("More than one environment has that name."),
        "env_active" => Some("The environment is currently active."),
        "not_an_environment" => Some("The directory does not contain a Python interpreter."),
        "missing_tool" => Some("A required tool is not installed."),
        "poetry_env_not_in_project" => {
            Some("Poetry created its environment outside the project directory.")
        }
        "package_not_found" => Some("The package index has no project with that name."),
        "no_versions" => Some("The package has no published releases."),
        "empty_query" => Some("The search query is empty."),
        "requirements_unreadable" => Some("The requirements file could not be read."),
        "tool_failed" => Some("An external command failed."),
        "timeout" => Some("An external command did not finish in time."),
        "internal_error" => Some("venvx hit an unexpected error."),
        _ => None,
    }
}
