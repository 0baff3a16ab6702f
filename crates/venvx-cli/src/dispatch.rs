use color_eyre::Result;
use venvx_core::api as venvx_core;
use venvx_core::{
    CommandContext, CommandGroup, CommandInfo, CreateBackend, EnvActivateRequest, EnvAddRequest,
    EnvCreateRequest, EnvDeactivateRequest, EnvDeleteRequest, EnvListRequest, EnvironmentKind,
    ExecutionOutcome, PkgInstallRequest, PkgListRequest, PkgSearchRequest, PkgUninstallRequest,
    PkgUnusedRequest, PkgUpdateAllRequest, PkgUpdateRequest, ReqsExportRequest, ReqsImportRequest,
};

use crate::cli::{
    BackendArg, CommandGroupCli, EnvCommand, EnvCreateArgs, KindArg, PkgCommand, ReqsCommand,
};

pub fn dispatch_command(
    ctx: &CommandContext,
    group: &CommandGroupCli,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    match group {
        CommandGroupCli::Env(cmd) => dispatch_env(ctx, cmd),
        CommandGroupCli::Pkg(cmd) => dispatch_pkg(ctx, cmd),
        CommandGroupCli::Reqs(cmd) => dispatch_reqs(ctx, cmd),
    }
}

fn dispatch_env(ctx: &CommandContext, cmd: &EnvCommand) -> Result<(CommandInfo, ExecutionOutcome)> {
    match cmd {
        EnvCommand::List(args) => {
            let info = CommandInfo::new(CommandGroup::Env, "list");
            let request = EnvListRequest {
                filter: args.filter.clone(),
            };
            core_call(info, || venvx_core::env_list(ctx, &request))
        }
        EnvCommand::Create(args) => {
            let info = CommandInfo::new(CommandGroup::Env, "create");
            let request = env_create_request_from_args(args);
            core_call(info, || venvx_core::env_create(ctx, &request))
        }
        EnvCommand::Add(args) => {
            let info = CommandInfo::new(CommandGroup::Env, "add");
            let request = EnvAddRequest {
                path: args.path.clone(),
                kind: args.kind.map(environment_kind),
            };
            core_call(info, || venvx_core::env_add(ctx, &request))
        }
        EnvCommand::Activate(args) => {
            let info = CommandInfo::new(CommandGroup::Env, "activate");
            let request = EnvActivateRequest {
                target: args.target.clone(),
            };
            core_call(info, || venvx_core::env_activate(ctx, &request))
        }
        EnvCommand::Deactivate => {
            let info = CommandInfo::new(CommandGroup::Env, "deactivate");
            core_call(info, || {
                venvx_core::env_deactivate(ctx, &EnvDeactivateRequest)
            })
        }
        EnvCommand::Delete(args) => {
            let info = CommandInfo::new(CommandGroup::Env, "delete");
            let request = EnvDeleteRequest {
                target: args.target.clone(),
            };
            core_call(info, || venvx_core::env_delete(ctx, &request))
        }
    }
}

fn dispatch_pkg(ctx: &CommandContext, cmd: &PkgCommand) -> Result<(CommandInfo, ExecutionOutcome)> {
    match cmd {
        PkgCommand::List(args) => {
            let info = CommandInfo::new(CommandGroup::Pkg, "list");
            let request = PkgListRequest {
                offline_index: args.offline_index,
                skip_unused: args.skip_unused,
            };
            core_call(info, || venvx_core::pkg_list(ctx, &request))
        }
        PkgCommand::Install(args) => {
            let info = CommandInfo::new(CommandGroup::Pkg, "install");
            let request = PkgInstallRequest {
                name: args.name.clone(),
                version: args.version.clone(),
            };
            core_call(info, || venvx_core::pkg_install(ctx, &request))
        }
        PkgCommand::Uninstall(args) => {
            let info = CommandInfo::new(CommandGroup::Pkg, "uninstall");
            let request = PkgUninstallRequest {
                name: args.name.clone(),
            };
            core_call(info, || venvx_core::pkg_uninstall(ctx, &request))
        }
        PkgCommand::Update(args) => {
            let info = CommandInfo::new(CommandGroup::Pkg, "update");
            let request = PkgUpdateRequest {
                name: args.name.clone(),
            };
            core_call(info, || venvx_core::pkg_update(ctx, &request))
        }
        PkgCommand::UpdateAll => {
            let info = CommandInfo::new(CommandGroup::Pkg, "update-all");
            core_call(info, || {
                venvx_core::pkg_update_all(ctx, &PkgUpdateAllRequest)
            })
        }
        PkgCommand::Unused => {
            let info = CommandInfo::new(CommandGroup::Pkg, "unused");
            core_call(info, || venvx_core::pkg_unused(ctx, &PkgUnusedRequest))
        }
        PkgCommand::Search(args) => {
            let info = CommandInfo::new(CommandGroup::Pkg, "search");
            let request = PkgSearchRequest {
                query: args.query.clone(),
            };
            core_call(info, || venvx_core::pkg_search(ctx, &request))
        }
    }
}

fn dispatch_reqs(
    ctx: &CommandContext,
    cmd: &ReqsCommand,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    match cmd {
        ReqsCommand::Import(args) => {
            let info = CommandInfo::new(CommandGroup::Reqs, "import");
            let request = ReqsImportRequest {
                file: args.file.clone(),
            };
            core_call(info, || venvx_core::reqs_import(ctx, &request))
        }
        ReqsCommand::Export(args) => {
            let info = CommandInfo::new(CommandGroup::Reqs, "export");
            let request = ReqsExportRequest {
                file: args.file.clone(),
            };
            core_call(info, || venvx_core::reqs_export(ctx, &request))
        }
    }
}

fn env_create_request_from_args(args: &EnvCreateArgs) -> EnvCreateRequest {
    EnvCreateRequest {
        backend: match args.backend {
            BackendArg::Venv => CreateBackend::Venv,
            BackendArg::Poetry => CreateBackend::Poetry,
            BackendArg::Uv => CreateBackend::Uv,
        },
        dir: args.dir.clone(),
        name: args.name.clone(),
        python: args.python.clone(),
    }
}

fn environment_kind(kind: KindArg) -> EnvironmentKind {
    match kind {
        KindArg::Venv => EnvironmentKind::Venv,
        KindArg::Conda => EnvironmentKind::Conda,
        KindArg::Poetry => EnvironmentKind::Poetry,
        KindArg::Pipenv => EnvironmentKind::Pipenv,
        KindArg::Uv => EnvironmentKind::Uv,
    }
}

/// Runs a handler and folds any escaped error into an outcome so every
/// command renders through the same path.
fn core_call<F>(info: CommandInfo, action: F) -> Result<(CommandInfo, ExecutionOutcome)>
where
    F: FnOnce() -> anyhow::Result<ExecutionOutcome>,
{
    match action() {
        Ok(outcome) => Ok((info, outcome)),
        Err(err) => {
            tracing::debug!(command = info.name, error = ?err, "command failed");
            Ok((info, venvx_core::outcome_from_error(&err)))
        }
    }
}
