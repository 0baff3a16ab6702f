#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

mod core;

pub mod api;

pub const VENVX_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::config::context::{CommandContext, CommandInfo};
pub use crate::core::config::{Config, GlobalOptions, NetworkConfig, TimeoutConfig};
pub use crate::core::runtime::effects::{Effects, SharedEffects, SystemEffects};
pub use crate::core::runtime::process::{ProcessTimeout, RunOutput, ToolFailure};
pub use crate::core::runtime::{
    format_status_message, outcome_from_error, to_json_response, CommandGroup,
};
pub use crate::core::state_store::JsonFileStateStore;
pub use crate::core::tooling::diagnostics::commands as diag_commands;
pub use venvx_domain::EnvironmentKind;
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome, UserFacingError};
pub use crate::core::tooling::{progress, prompt};

pub use crate::core::envs::{
    env_activate, env_add, env_create, env_deactivate, env_delete, env_list, CreateBackend,
    EnvActivateRequest, EnvAddRequest, EnvCreateRequest, EnvDeactivateRequest, EnvDeleteRequest,
    EnvListRequest,
};
pub use crate::core::packages::{
    pkg_install, pkg_list, pkg_search, pkg_uninstall, pkg_unused, pkg_update, pkg_update_all,
    PkgInstallRequest, PkgListRequest, PkgSearchRequest, PkgUninstallRequest, PkgUnusedRequest,
    PkgUpdateAllRequest, PkgUpdateRequest,
};
pub use crate::core::requirements::{
    reqs_export, reqs_import, ReqsExportRequest, ReqsImportRequest,
};
