//! CLI-facing diagnostics, progress reporting, prompts, and outcome shaping.

pub(crate) mod diagnostics;
mod messages;
pub(crate) mod outcome;
pub mod progress;
pub mod prompt;

pub(crate) use messages::*;
