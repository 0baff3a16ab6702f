//! `requirements.txt` import and export for the active environment.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use crate::core::packages::{requirement_name, ActiveEnv};
use crate::progress::ProgressReporter;
use crate::{CommandContext, ExecutionOutcome};

const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";

#[derive(Clone, Debug)]
pub struct ReqsImportRequest {
    pub file: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct ReqsExportRequest {
    /// Destination; defaults to `requirements.txt` in the first workspace root.
    pub file: Option<PathBuf>,
}

/// Requirement names listed in a requirements file, skipping comments,
/// options and blank lines.
fn listed_requirements(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.split(" #").next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .map(requirement_name)
        .collect()
}

/// Installs everything listed in a requirements file.
///
/// # Errors
/// Returns an error if pip fails or state cannot be read.
pub fn reqs_import(ctx: &CommandContext, request: &ReqsImportRequest) -> Result<ExecutionOutcome> {
    let active = match ActiveEnv::resolve(ctx)? {
        Ok(active) => active,
        Err(outcome) => return Ok(outcome),
    };
    let contents = match ctx.fs().read_to_string(&request.file) {
        Ok(contents) => contents,
        Err(err) => {
            return Ok(ExecutionOutcome::user_error(
                format!("cannot read {}", request.file.display()),
                json!({
                    "reason": "requirements_unreadable",
                    "file": request.file.display().to_string(),
                    "error": err.to_string(),
                }),
            ))
        }
    };
    let requirements = listed_requirements(&contents);
    let spinner = ProgressReporter::spinner(format!("pip install -r {}", request.file.display()));
    active.pip.install_requirements(&request.file)?;
    spinner.finish(format!("Installed {} requirements", requirements.len()));
    Ok(ExecutionOutcome::success(
        format!("installed requirements from {}", request.file.display()),
        json!({
            "env": active.path,
            "file": request.file.display().to_string(),
            "requirements": requirements,
        }),
    ))
}

/// Writes `pip freeze` output of the active environment to a file.
///
/// # Errors
/// Returns an error if pip fails, the file cannot be written, or state cannot
/// be read.
pub fn reqs_export(ctx: &CommandContext, request: &ReqsExportRequest) -> Result<ExecutionOutcome> {
    let active = match ActiveEnv::resolve(ctx)? {
        Ok(active) => active,
        Err(outcome) => return Ok(outcome),
    };
    let target = request
        .file
        .clone()
        .unwrap_or_else(|| ctx.primary_root().join(DEFAULT_REQUIREMENTS_FILE));
    let frozen = active.pip.freeze()?;
    ctx.fs().write(&target, frozen.as_bytes())?;
    let count = frozen
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();
    Ok(ExecutionOutcome::success(
        format!("exported {count} packages to {}", target.display()),
        json!({
            "env": active.path,
            "file": target.display().to_string(),
            "packages": count,
        }),
    ))
}
