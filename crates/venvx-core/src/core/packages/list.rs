use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use serde_json::json;
use venvx_domain::{package_statuses, packages_view, PackageListing};

use super::active::{latest_versions, ActiveEnv};
use super::unused::scan_unused;
use crate::core::tooling::outcome::merge_details;
use crate::{outcome_from_error, CommandContext, ExecutionOutcome};

#[derive(Clone, Debug, Default)]
pub struct PkgListRequest {
    /// Skip latest-version lookups against the index.
    pub offline_index: bool,
    /// Skip the unused-package heuristic.
    pub skip_unused: bool,
}

/// Lists packages in the active environment with update and usage hints.
///
/// # Errors
/// Returns an error if persisted state cannot be read.
pub fn pkg_list(ctx: &CommandContext, request: &PkgListRequest) -> Result<ExecutionOutcome> {
    let active = match ActiveEnv::resolve(ctx)? {
        Ok(active) => active,
        Err(mut outcome) => {
            merge_details(
                &mut outcome.details,
                json!({ "view": packages_view(&PackageListing::NoActiveEnvironment) }),
            );
            return Ok(outcome);
        }
    };
    let records = match active.pip.list() {
        Ok(records) => records,
        Err(err) => {
            let mut outcome = outcome_from_error(&err);
            merge_details(
                &mut outcome.details,
                json!({
                    "env": active.path,
                    "view": packages_view(&PackageListing::Failed(err.to_string())),
                }),
            );
            return Ok(outcome);
        }
    };
    let latest = if request.offline_index {
        HashMap::new()
    } else {
        latest_versions(ctx, &records)
    };
    let unused = if request.skip_unused {
        BTreeSet::new()
    } else {
        scan_unused(ctx, &active.pip).unused
    };
    let statuses = package_statuses(&records, &latest, &unused);
    let updates = statuses.iter().filter(|status| status.outdated).count();
    let message = match (statuses.len(), updates) {
        (0, _) => "no packages installed".to_string(),
        (count, 0) => format!("{count} packages"),
        (count, updates) => format!("{count} packages, {updates} with updates"),
    };
    let view = packages_view(&PackageListing::Listed(statuses.clone()));
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "env": active.path,
            "packages": statuses,
            "updates": updates,
            "view": view,
        }),
    ))
}
