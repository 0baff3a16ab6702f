#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod discovery;
pub mod environment;
pub mod external;
pub mod imports;
pub mod index;
pub mod packages;
pub mod state;
pub mod views;

pub use discovery::{
    dedupe_by_path, filter_environments, find_environment, merge_environments, EnvLookup,
};
pub use environment::{
    canonical_path, canonical_path_from, Environment, EnvironmentKind, CANDIDATE_DIRS,
    UNKNOWN_VERSION,
};
pub use external::ExternalResult;
pub use imports::{
    collect_used_modules, find_unused_distributions, IdentifierExtractor, ImportScanner,
};
pub use index::{
    extract_search_names, version_choices, ProjectInfo, ProjectMetadata, SearchHit, SearchMarkup,
    VersionChoice, MAX_SEARCH_RESULTS,
};
pub use packages::{
    is_outdated, package_statuses, parse_pip_list, sort_packages, PackageRecord, PackageStatus,
};
pub use state::{
    EnvState, MemoryStateStore, StateChange, StateStore, ACTIVE_ENV_KEY, MANUAL_ENVS_KEY,
};
pub use views::{environments_view, packages_view, PackageListing, ViewItem};
