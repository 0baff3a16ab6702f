//! Internal implementation modules for `venvx-core`.
//!
//! Most callers should go through `venvx_core::api` rather than importing
//! these modules directly.

pub mod config;
pub mod envs;
pub mod index;
pub mod net;
pub mod packages;
pub mod python;
pub mod requirements;
pub mod runtime;
pub mod state_store;
#[cfg(test)]
pub(crate) mod testing;
pub mod tooling;
