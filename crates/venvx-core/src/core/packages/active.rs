use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use pep508_rs::Requirement as PepRequirement;
use venvx_domain::PackageRecord;

use crate::core::python::Pip;
use crate::core::tooling::{missing_interpreter_outcome, no_active_environment_outcome};
use crate::{CommandContext, ExecutionOutcome};

/// The active environment together with a pip bound to its interpreter.
pub(crate) struct ActiveEnv<'c> {
    pub(crate) path: String,
    pub(crate) pip: Pip<'c>,
}

impl<'c> ActiveEnv<'c> {
    /// Resolves the active slot, or the outcome explaining why there is no
    /// usable environment.
    pub(crate) fn resolve(ctx: &'c CommandContext<'_>) -> Result<Result<Self, ExecutionOutcome>> {
        let Some(path) = ctx.state().active_path()? else {
            return Ok(Err(no_active_environment_outcome()));
        };
        let Some(pip) = Pip::for_environment(
            ctx.python_runtime(),
            Path::new(&path),
            ctx.config().timeouts().command,
        ) else {
            return Ok(Err(missing_interpreter_outcome(&path)));
        };
        tracing::debug!(env = %path, python = %pip.python().display(), "using active environment");
        Ok(Ok(Self { path, pip }))
    }
}

/// Distribution name of a requirement string, or the trimmed input when it
/// does not parse.
pub(crate) fn requirement_name(spec: &str) -> String {
    PepRequirement::from_str(spec.trim())
        .map_or_else(|_| spec.trim().to_string(), |req| req.name.to_string())
}

/// Latest index versions keyed by package name. Lookups that fail or find
/// nothing are left out.
pub(crate) fn latest_versions(
    ctx: &CommandContext,
    records: &[PackageRecord],
) -> HashMap<String, String> {
    let network = ctx.config().network();
    let mut latest = HashMap::new();
    for record in records {
        match ctx.index().project(network, &record.name) {
            Ok(Some(metadata)) => {
                if let Some(version) = metadata.latest_version() {
                    latest.insert(record.name.clone(), version.to_string());
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(package = %record.name, %err, "latest version lookup failed");
            }
        }
    }
    latest
}
