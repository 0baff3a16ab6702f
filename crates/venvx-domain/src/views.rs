//! View models for the environment and package listings.

use serde::Serialize;

use crate::environment::Environment;
use crate::packages::PackageStatus;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ViewItem {
    Header { label: String },
    Placeholder { label: String },
    Environment(Environment),
    Package(PackageStatus),
}

impl ViewItem {
    pub fn header(label: impl Into<String>) -> Self {
        ViewItem::Header {
            label: label.into(),
        }
    }

    pub fn placeholder(label: impl Into<String>) -> Self {
        ViewItem::Placeholder {
            label: label.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ViewItem::Placeholder { .. })
    }
}

pub const NO_ENVIRONMENTS: &str = "No Python environments found";
pub const NO_ACTIVE_ENVIRONMENT: &str = "No active environment";
pub const NO_PACKAGES: &str = "No packages installed";

pub fn environments_view(envs: &[Environment]) -> Vec<ViewItem> {
    if envs.is_empty() {
        return vec![ViewItem::placeholder(NO_ENVIRONMENTS)];
    }
    envs.iter().cloned().map(ViewItem::Environment).collect()
}

/// Outcome of listing packages for the active environment.
#[derive(Clone, Debug)]
pub enum PackageListing {
    NoActiveEnvironment,
    Failed(String),
    Listed(Vec<PackageStatus>),
}

pub fn packages_view(listing: &PackageListing) -> Vec<ViewItem> {
    let packages = match listing {
        PackageListing::NoActiveEnvironment => {
            return vec![ViewItem::placeholder(NO_ACTIVE_ENVIRONMENT)]
        }
        PackageListing::Failed(reason) => {
            return vec![ViewItem::placeholder(format!(
                "Error loading packages: {reason}"
            ))]
        }
        PackageListing::Listed(packages) => packages,
    };
    if packages.is_empty() {
        return vec![ViewItem::placeholder(NO_PACKAGES)];
    }
    let mut items = Vec::with_capacity(packages.len() + 1);
    let updates = packages.iter().filter(|pkg| pkg.outdated).count();
    if updates > 0 {
        let noun = if updates == 1 { "update" } else { "updates" };
        items.push(ViewItem::header(format!("{updates} {noun} available")));
    }
    items.extend(packages.iter().cloned().map(ViewItem::Package));
    items
}
