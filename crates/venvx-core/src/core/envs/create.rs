use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::json;
use venvx_domain::{Environment, EnvironmentKind};

use crate::core::python::{create_venv, probe_environment};
use crate::core::runtime::process::{ensure_success, CommandSpec};
use crate::progress::ProgressReporter;
use crate::{CommandContext, ExecutionOutcome, UserFacingError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CreateBackend {
    #[default]
    Venv,
    Poetry,
    Uv,
}

#[derive(Clone, Debug, Default)]
pub struct EnvCreateRequest {
    pub backend: CreateBackend,
    /// Project directory; defaults to the first workspace root.
    pub dir: Option<PathBuf>,
    /// Directory name for `venv` environments.
    pub name: Option<String>,
    /// Interpreter used to create the environment.
    pub python: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EnvAddRequest {
    pub path: PathBuf,
    pub kind: Option<EnvironmentKind>,
}

const DEFAULT_VENV_NAME: &str = ".venv";

fn default_python() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

/// Creates an environment with the requested backend and registers it.
///
/// # Errors
/// Returns an error if an external tool fails or state cannot be written.
pub fn env_create(ctx: &CommandContext, request: &EnvCreateRequest) -> Result<ExecutionOutcome> {
    let project_dir = request
        .dir
        .clone()
        .unwrap_or_else(|| ctx.primary_root());
    let project_dir = PathBuf::from(venvx_domain::canonical_path(
        &project_dir.to_string_lossy(),
    ));
    let created = match request.backend {
        CreateBackend::Venv => create_with_venv(ctx, &project_dir, request)?,
        CreateBackend::Poetry => create_with_poetry(ctx, &project_dir, request.python.as_deref())?,
        CreateBackend::Uv => create_with_uv(ctx, &project_dir)?,
    };
    let added = ctx.state().add_manual(&created)?;
    Ok(ExecutionOutcome::success(
        format!("created {} environment at {}", created.kind, created.path),
        json!({
            "environment": created,
            "registered": added,
        }),
    ))
}

fn create_with_venv(
    ctx: &CommandContext,
    project_dir: &Path,
    request: &EnvCreateRequest,
) -> Result<Environment> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_VENV_NAME);
    let python = request
        .python
        .as_deref()
        .map(str::trim)
        .filter(|python| !python.is_empty())
        .unwrap_or(default_python());
    let target = project_dir.join(name);
    let spinner = ProgressReporter::spinner(format!("Creating venv at {}", target.display()));
    create_venv(
        ctx.python_runtime(),
        python,
        &target,
        ctx.config().timeouts().command,
    )?;
    spinner.finish(format!("Created venv at {}", target.display()));
    inspect_created(ctx, &target, EnvironmentKind::Venv).ok_or_else(|| {
        anyhow::anyhow!(
            "could not inspect the environment created at {}",
            target.display()
        )
    })
}

fn create_with_poetry(
    ctx: &CommandContext,
    project_dir: &Path,
    python: Option<&str>,
) -> Result<Environment> {
    let poetry = require_tool(ctx, "poetry")?;
    let timeout = ctx.config().timeouts().command;
    let runtime = ctx.python_runtime();
    let mut spinner = ProgressReporter::spinner("poetry env use");
    if let Some(python) = python.map(str::trim).filter(|python| !python.is_empty()) {
        let spec = CommandSpec::new(&poetry, ["env", "use", python], timeout).cwd(project_dir);
        ensure_success(format!("poetry env use {python}"), runtime.run(&spec)?)?;
    }
    spinner.set_label("poetry install");
    let spec = CommandSpec::new(&poetry, ["install"], timeout).cwd(project_dir);
    match runtime.run(&spec) {
        Ok(output) if output.success() => {}
        Ok(output) => {
            tracing::warn!(code = output.code, "poetry install failed; continuing");
        }
        Err(err) => tracing::warn!(%err, "poetry install failed; continuing"),
    }
    drop(spinner);
    let candidate = project_dir.join(DEFAULT_VENV_NAME);
    inspect_created(ctx, &candidate, EnvironmentKind::Poetry).ok_or_else(|| {
        UserFacingError::new(
            format!("no .venv found in {}", project_dir.display()),
            json!({
                "reason": "poetry_env_not_in_project",
                "hint": "run `poetry config virtualenvs.in-project true` or add the environment with `venvx env add`",
            }),
        )
        .into()
    })
}

fn create_with_uv(ctx: &CommandContext, project_dir: &Path) -> Result<Environment> {
    let uv = require_tool(ctx, "uv")?;
    let timeout = ctx.config().timeouts().command;
    let runtime = ctx.python_runtime();
    let target = project_dir.join(DEFAULT_VENV_NAME);
    let target_arg = target.to_string_lossy();
    let mut spinner = ProgressReporter::spinner("uv venv");
    let venv = CommandSpec::new(&uv, ["venv", target_arg.as_ref()], timeout).cwd(project_dir);
    let created = match runtime.run(&venv) {
        Ok(output) => output.success(),
        Err(err) => {
            tracing::debug!(%err, "uv venv failed to start");
            false
        }
    };
    if !created {
        spinner.set_label("uv sync");
        let sync = CommandSpec::new(&uv, ["sync"], timeout).cwd(project_dir);
        ensure_success("uv sync", runtime.run(&sync)?)?;
    }
    drop(spinner);
    inspect_created(ctx, &target, EnvironmentKind::Uv).ok_or_else(|| {
        anyhow::anyhow!("could not detect the uv environment at {}", target.display())
    })
}

fn require_tool(ctx: &CommandContext, name: &str) -> Result<String> {
    ctx.python_runtime()
        .find_executable(name)
        .map(|path| path.to_string_lossy().to_string())
        .ok_or_else(|| {
            UserFacingError::new(
                format!("{name} executable not found on PATH"),
                json!({
                    "reason": "missing_tool",
                    "tool": name,
                    "hint": format!("install {name} or pick another backend with `--backend`"),
                }),
            )
            .into()
        })
}

fn inspect_created(ctx: &CommandContext, dir: &Path, kind: EnvironmentKind) -> Option<Environment> {
    probe_environment(
        ctx.python_runtime(),
        dir,
        Some(kind),
        ctx.config().timeouts().probe,
    )
}

/// Registers an existing environment directory.
///
/// # Errors
/// Returns an error if state cannot be written.
pub fn env_add(ctx: &CommandContext, request: &EnvAddRequest) -> Result<ExecutionOutcome> {
    let Some(env) = probe_environment(
        ctx.python_runtime(),
        &request.path,
        request.kind,
        ctx.config().timeouts().probe,
    ) else {
        return Ok(ExecutionOutcome::user_error(
            format!("{} is not a Python environment", request.path.display()),
            json!({
                "reason": "not_an_environment",
                "path": request.path.display().to_string(),
                "hint": "select a directory that contains bin/python3 (Scripts\\python.exe on Windows)",
            }),
        ));
    };
    let added = ctx.state().add_manual(&env)?;
    let message = if added {
        format!("added {} ({})", env.name, env.path)
    } else {
        format!("{} is already registered", env.path)
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({ "environment": env, "registered": added }),
    ))
}
