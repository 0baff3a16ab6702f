use serde_json::Value;
use venvx_core::api as venvx_core;
use venvx_core::{CommandGroup, CommandInfo};

use super::tables::format_table;
use crate::style::Style;

pub(super) fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

pub(super) fn output_from_details<'a>(details: &'a Value, key: &str) -> Option<&'a str> {
    details
        .as_object()
        .and_then(|map| map.get(key))
        .and_then(Value::as_str)
        .map(str::trim_end)
        .filter(|text| !text.trim().is_empty())
}

/// Lines printed under the status line for commands with structured output.
pub(super) fn body_lines(style: &Style, info: CommandInfo, details: &Value) -> Vec<String> {
    match (info.group, info.name) {
        (CommandGroup::Env, "list") => environment_lines(style, details),
        (CommandGroup::Env, "activate") => {
            let mut lines = activation_lines(details);
            lines.extend(environment_lines(style, details));
            lines
        }
        (CommandGroup::Env, "deactivate") => environment_lines(style, details),
        (CommandGroup::Env, "create") => created_lines(details),
        (CommandGroup::Pkg, "list") => package_lines(style, details),
        (CommandGroup::Pkg, "search") => search_lines(style, details),
        (CommandGroup::Pkg, "unused") => unused_lines(style, details),
        (CommandGroup::Pkg, "update-all") => update_all_lines(style, details),
        _ => Vec::new(),
    }
}

fn view_items(details: &Value) -> &[Value] {
    details
        .get("view")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn string_list(details: &Value, key: &str) -> Vec<String> {
    details
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn environment_lines(style: &Style, details: &Value) -> Vec<String> {
    let active = details.get("active").and_then(Value::as_str);
    let mut lines = Vec::new();
    let mut rows = Vec::new();
    for item in view_items(details) {
        match str_field(item, "kind") {
            "placeholder" => lines.push(style.muted(str_field(item, "label"))),
            "environment" => {
                let path = str_field(item, "path");
                let marker = if Some(path) == active { "*" } else { "" };
                rows.push(vec![
                    marker.to_string(),
                    str_field(item, "name").to_string(),
                    str_field(item, "type").to_string(),
                    str_field(item, "pythonVersion").to_string(),
                    path.to_string(),
                ]);
            }
            _ => {}
        }
    }
    if !rows.is_empty() {
        lines.extend(format_table(
            style,
            &["", "Name", "Type", "Python", "Path"],
            &rows,
        ));
    }
    lines
}

fn activation_lines(details: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    match details.get("interpreter").and_then(Value::as_str) {
        Some(interpreter) => lines.push(format!("  interpreter: {interpreter}")),
        None => lines.push("  interpreter: (not found)".to_string()),
    }
    if let Some(vars) = details.get("env").and_then(Value::as_object) {
        for (key, value) in vars {
            if let Some(value) = value.as_str() {
                lines.push(format!("  {key}={value}"));
            }
        }
    }
    lines
}

fn created_lines(details: &Value) -> Vec<String> {
    let Some(env) = details.get("environment") else {
        return Vec::new();
    };
    vec![format!(
        "  {} (python {})",
        str_field(env, "path"),
        str_field(env, "pythonVersion")
    )]
}

fn package_lines(style: &Style, details: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rows = Vec::new();
    for item in view_items(details) {
        match str_field(item, "kind") {
            "header" => lines.push(style.info(str_field(item, "label"))),
            "placeholder" => lines.push(style.muted(str_field(item, "label"))),
            "package" => {
                let mut notes = Vec::new();
                if item.get("outdated").and_then(Value::as_bool) == Some(true) {
                    notes.push("update available");
                }
                if item.get("unused").and_then(Value::as_bool) == Some(true) {
                    notes.push("unused");
                }
                rows.push(vec![
                    str_field(item, "name").to_string(),
                    str_field(item, "version").to_string(),
                    str_field(item, "latest").to_string(),
                    notes.join(", "),
                ]);
            }
            _ => {}
        }
    }
    if !rows.is_empty() {
        lines.extend(format_table(
            style,
            &["Package", "Version", "Latest", "Notes"],
            &rows,
        ));
    }
    lines
}

fn search_lines(style: &Style, details: &Value) -> Vec<String> {
    let rows: Vec<Vec<String>> = details
        .get("results")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .map(|hit| {
                    vec![
                        str_field(hit, "name").to_string(),
                        str_field(hit, "version").to_string(),
                        str_field(hit, "summary").to_string(),
                    ]
                })
                .collect()
        })
        .unwrap_or_default();
    if rows.is_empty() {
        return Vec::new();
    }
    format_table(style, &["Name", "Version", "Summary"], &rows)
}

fn unused_lines(style: &Style, details: &Value) -> Vec<String> {
    let unused = string_list(details, "unused");
    if unused.is_empty() {
        return vec![style.muted("  every installed package is imported")];
    }
    unused.iter().map(|name| format!("  • {name}")).collect()
}

fn update_all_lines(style: &Style, details: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    let updated = string_list(details, "updated");
    if !updated.is_empty() {
        lines.push(format!("  updated: {}", updated.join(", ")));
    }
    if let Some(failed) = details.get("failed").and_then(Value::as_str) {
        lines.push(style.warning(&format!("  failed: {failed}")));
    }
    let skipped = string_list(details, "skipped");
    if !skipped.is_empty() {
        lines.push(style.muted(&format!("  skipped: {}", skipped.join(", "))));
    }
    lines
}
