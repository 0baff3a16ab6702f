use std::collections::BTreeSet;

use anyhow::Result;
use serde_json::json;
use venvx_domain::{package_statuses, version_choices, PackageStatus};

use super::active::{latest_versions, requirement_name, ActiveEnv};
use crate::core::tooling::cancelled_outcome;
use crate::core::tooling::outcome::merge_details;
use crate::progress::ProgressReporter;
use crate::{outcome_from_error, CommandContext, ExecutionOutcome};

#[derive(Clone, Debug)]
pub struct PkgInstallRequest {
    pub name: String,
    /// Skips the version picker.
    pub version: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PkgUninstallRequest {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct PkgUpdateRequest {
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct PkgUpdateAllRequest;

/// Installs a package at a version picked from the index.
///
/// # Errors
/// Returns an error if pip fails or state cannot be read.
pub fn pkg_install(ctx: &CommandContext, request: &PkgInstallRequest) -> Result<ExecutionOutcome> {
    let active = match ActiveEnv::resolve(ctx)? {
        Ok(active) => active,
        Err(outcome) => return Ok(outcome),
    };
    let name = requirement_name(&request.name);
    let Some(metadata) = ctx.index().project(ctx.config().network(), &name)? else {
        let mut hint = format!("check the spelling or search with `venvx pkg search {name}`");
        if !ctx.is_online() {
            hint.push_str(" (index lookups are disabled by VENVX_ONLINE=0)");
        }
        return Ok(ExecutionOutcome::user_error(
            format!("package {name} not found on the index"),
            json!({
                "reason": "package_not_found",
                "package": name,
                "hint": hint,
            }),
        ));
    };
    let version = match request.version.as_deref().map(str::trim) {
        Some(version) if !version.is_empty() => version.to_string(),
        _ => {
            let choices = version_choices(&metadata);
            if choices.is_empty() {
                return Ok(ExecutionOutcome::user_error(
                    format!("the index lists no versions for {}", metadata.info.name),
                    json!({ "reason": "no_versions", "package": metadata.info.name }),
                ));
            }
            let labels: Vec<String> = choices
                .iter()
                .map(|choice| {
                    if choice.latest {
                        format!("{} (latest)", choice.version)
                    } else {
                        choice.version.clone()
                    }
                })
                .collect();
            let title = format!("Select a version of {}", metadata.info.name);
            let picked = ctx.prompter().select(&title, &labels, 0)?;
            let Some(choice) = picked.and_then(|idx| choices.get(idx)) else {
                return Ok(cancelled_outcome("install"));
            };
            choice.version.clone()
        }
    };
    let spec = format!("{}=={version}", metadata.info.name);
    let spinner = ProgressReporter::spinner(format!("Installing {spec}"));
    active.pip.install(&spec)?;
    spinner.finish(format!("Installed {spec}"));
    Ok(ExecutionOutcome::success(
        format!("installed {spec}"),
        json!({
            "env": active.path,
            "package": metadata.info.name,
            "version": version,
        }),
    ))
}

/// Uninstalls a package after confirmation.
///
/// # Errors
/// Returns an error if pip fails or state cannot be read.
pub fn pkg_uninstall(
    ctx: &CommandContext,
    request: &PkgUninstallRequest,
) -> Result<ExecutionOutcome> {
    let active = match ActiveEnv::resolve(ctx)? {
        Ok(active) => active,
        Err(outcome) => return Ok(outcome),
    };
    let name = request.name.trim();
    if !ctx.prompter().confirm(&format!("Uninstall {name}?"), false)? {
        return Ok(cancelled_outcome("uninstall"));
    }
    active.pip.uninstall(name)?;
    Ok(ExecutionOutcome::success(
        format!("uninstalled {name}"),
        json!({ "env": active.path, "package": name }),
    ))
}

/// Upgrades one package to the newest version pip can find.
///
/// # Errors
/// Returns an error if pip fails or state cannot be read.
pub fn pkg_update(ctx: &CommandContext, request: &PkgUpdateRequest) -> Result<ExecutionOutcome> {
    let active = match ActiveEnv::resolve(ctx)? {
        Ok(active) => active,
        Err(outcome) => return Ok(outcome),
    };
    let name = request.name.trim();
    let spinner = ProgressReporter::spinner(format!("Updating {name}"));
    active.pip.upgrade(name)?;
    spinner.finish(format!("Updated {name}"));
    Ok(ExecutionOutcome::success(
        format!("updated {name}"),
        json!({ "env": active.path, "package": name }),
    ))
}

/// Upgrades every outdated package, one at a time.
///
/// The first failure stops the run: earlier upgrades stay applied and the
/// rest are reported as skipped.
///
/// # Errors
/// Returns an error if the package list cannot be read or state cannot be
/// read.
pub fn pkg_update_all(
    ctx: &CommandContext,
    _request: &PkgUpdateAllRequest,
) -> Result<ExecutionOutcome> {
    let active = match ActiveEnv::resolve(ctx)? {
        Ok(active) => active,
        Err(outcome) => return Ok(outcome),
    };
    let records = active.pip.list()?;
    let latest = latest_versions(ctx, &records);
    let outdated: Vec<PackageStatus> = package_statuses(&records, &latest, &BTreeSet::new())
        .into_iter()
        .filter(|status| status.outdated)
        .collect();
    if outdated.is_empty() {
        return Ok(ExecutionOutcome::success(
            "nothing to update",
            json!({ "env": active.path, "updated": [], "failed": null, "skipped": [] }),
        ));
    }
    let question = format!("Update {} packages to their latest versions?", outdated.len());
    if !ctx.prompter().confirm(&question, false)? {
        return Ok(cancelled_outcome("update-all"));
    }

    let mut progress = ProgressReporter::bar("Updating packages", outdated.len());
    let mut updated = Vec::new();
    for (idx, status) in outdated.iter().enumerate() {
        let latest = status.latest.as_deref().unwrap_or_default();
        progress.set_label(format!("{} {} → {latest}", status.name, status.version));
        if let Err(err) = active.pip.upgrade(&status.name) {
            drop(progress);
            let skipped: Vec<&str> = outdated[idx + 1..]
                .iter()
                .map(|rest| rest.name.as_str())
                .collect();
            tracing::warn!(package = %status.name, %err, "bulk update stopped");
            let mut outcome = outcome_from_error(&err);
            outcome.message = format!("update-all stopped at {}: {err}", status.name);
            merge_details(
                &mut outcome.details,
                json!({
                    "env": active.path,
                    "updated": updated,
                    "failed": status.name,
                    "skipped": skipped,
                }),
            );
            return Ok(outcome);
        }
        updated.push(status.name.clone());
        progress.increment();
    }
    progress.finish(format!("Updated {} packages", updated.len()));
    Ok(ExecutionOutcome::success(
        format!("updated {} packages", updated.len()),
        json!({
            "env": active.path,
            "updated": updated,
            "failed": null,
            "skipped": [],
        }),
    ))
}
