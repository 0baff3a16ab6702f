//! Package operations against the active environment.

mod active;
mod install;
mod list;
mod search;
mod unused;

pub(crate) use active::{requirement_name, ActiveEnv};
pub use install::{
    pkg_install, pkg_uninstall, pkg_update, pkg_update_all, PkgInstallRequest,
    PkgUninstallRequest, PkgUpdateAllRequest, PkgUpdateRequest,
};
pub use list::{pkg_list, PkgListRequest};
pub use search::{pkg_search, PkgSearchRequest};
pub use unused::{pkg_unused, PkgUnusedRequest};
