use std::env;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Version string used when an interpreter cannot report its version.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Conventional environment directory names probed in every workspace root.
pub const CANDIDATE_DIRS: [&str; 2] = [".venv", "venv"];

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EnvironmentKind {
    #[default]
    Venv,
    Conda,
    Poetry,
    Pipenv,
    Uv,
}

/// An environment found on disk or registered by the user.
///
/// The path doubles as the identity. `is_active` is derived from the active
/// slot every time a view is built and is never written to state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub path: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: EnvironmentKind,
    #[serde(rename = "pythonVersion", default = "unknown_version")]
    pub python_version: String,
    #[serde(skip)]
    pub is_active: bool,
}

fn unknown_version() -> String {
    UNKNOWN_VERSION.to_string()
}

impl Environment {
    pub fn new(
        path: impl Into<String>,
        kind: EnvironmentKind,
        python_version: Option<String>,
    ) -> Self {
        let path = path.into();
        let name = Path::new(&path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.clone());
        Self {
            path,
            name,
            kind,
            python_version: python_version.unwrap_or_else(unknown_version),
            is_active: false,
        }
    }

    pub fn canonical_path(&self) -> String {
        canonical_path(&self.path)
    }
}

/// Absolute, lexically normalized form of `path`, relative to the current
/// directory.
pub fn canonical_path(path: &str) -> String {
    let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    canonical_path_from(&base, path)
}

/// Same as [`canonical_path`] with an explicit base for relative inputs.
///
/// Symlinks are left alone so that a path whose directory has been removed
/// still normalizes to the string it had while it existed.
pub fn canonical_path_from(base: &Path, path: &str) -> String {
    let raw = Path::new(path);
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        base.join(raw)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str());
            }
        }
    }
    normalized.to_string_lossy().to_string()
}
