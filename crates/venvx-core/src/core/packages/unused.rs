use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::json;
use venvx_domain::{collect_used_modules, find_unused_distributions, ImportScanner};
use walkdir::{DirEntry, WalkDir};

use super::active::ActiveEnv;
use crate::core::python::Pip;
use crate::{CommandContext, ExecutionOutcome};

pub(crate) const MAX_FILES_PER_ROOT: usize = 2000;
const SOURCE_EXTENSIONS: [&str; 1] = ["py"];
const SKIPPED_DIRS: [&str; 7] = [
    ".venv",
    "venv",
    "__pycache__",
    "node_modules",
    "dist",
    "build",
    ".git",
];

#[derive(Clone, Debug, Default)]
pub struct PkgUnusedRequest;

#[derive(Clone, Debug, Default)]
pub(crate) struct UnusedScan {
    pub(crate) unused: BTreeSet<String>,
    pub(crate) files_scanned: usize,
}

fn skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    SKIPPED_DIRS.contains(&name.as_ref()) || entry.path().join("pyvenv.cfg").is_file()
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Source files under `root`, at most [`MAX_FILES_PER_ROOT`].
pub(crate) fn workspace_sources(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !skipped(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_source(entry.path()))
        .map(DirEntry::into_path)
        .take(MAX_FILES_PER_ROOT)
        .collect()
}

/// Runs the unused-distribution heuristic for the environment behind `pip`.
///
/// An unknown distribution mapping yields nothing rather than an error.
pub(crate) fn scan_unused(ctx: &CommandContext, pip: &Pip<'_>) -> UnusedScan {
    let mapping = pip.distributions();
    if let Some(reason) = mapping.failure_reason() {
        tracing::debug!(reason, "distribution mapping unavailable");
    }
    let mapping = mapping.value_or_default();
    if mapping.is_empty() {
        return UnusedScan::default();
    }
    let mut texts = Vec::new();
    for root in ctx.workspace_roots() {
        for file in workspace_sources(&root) {
            // Sources with stray non-UTF-8 bytes still contribute their imports.
            match ctx.fs().read(&file) {
                Ok(bytes) => texts.push(String::from_utf8_lossy(&bytes).into_owned()),
                Err(err) => tracing::debug!(%err, "skipping unreadable source"),
            }
        }
    }
    let used = collect_used_modules(&ImportScanner, texts.iter().map(String::as_str));
    UnusedScan {
        unused: find_unused_distributions(&mapping, &used),
        files_scanned: texts.len(),
    }
}

/// Reports installed distributions with no detected import in the workspace.
///
/// # Errors
/// Returns an error if persisted state cannot be read.
pub fn pkg_unused(ctx: &CommandContext, _request: &PkgUnusedRequest) -> Result<ExecutionOutcome> {
    let active = match ActiveEnv::resolve(ctx)? {
        Ok(active) => active,
        Err(outcome) => return Ok(outcome),
    };
    let scan = scan_unused(ctx, &active.pip);
    let message = match scan.unused.len() {
        0 => "no unused packages detected".to_string(),
        1 => "1 package looks unused".to_string(),
        count => format!("{count} packages look unused"),
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "env": active.path,
            "unused": scan.unused,
            "files_scanned": scan.files_scanned,
        }),
    ))
}
