//! Tagged results for calls into interpreters, package managers and the index.
//!
//! Most of those calls are advisory: a failure degrades to "nothing known"
//! instead of aborting the caller. Keeping the three outcomes apart lets the
//! caller decide whether an empty answer and a failed one mean the same thing.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExternalResult<T> {
    Value(T),
    Empty,
    Failed(String),
}

impl<T> ExternalResult<T> {
    pub fn failed(reason: impl fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }

    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Self::Value)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Collapses empty and failed results into `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Empty | Self::Failed(_) => None,
        }
    }

    /// Runs `fallback` unless this result already carries a value.
    pub fn or_else(self, fallback: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value),
            Self::Empty | Self::Failed(_) => fallback(),
        }
    }
}

impl<T: Default> ExternalResult<T> {
    pub fn value_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}
