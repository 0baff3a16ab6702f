//! Environment discovery, creation, activation and removal.

mod activate;
mod create;
mod delete;
mod discover;

pub use activate::{env_activate, env_deactivate, EnvActivateRequest, EnvDeactivateRequest};
pub use create::{env_add, env_create, CreateBackend, EnvAddRequest, EnvCreateRequest};
pub use delete::{env_delete, EnvDeleteRequest};
pub use discover::{env_list, EnvListRequest};
