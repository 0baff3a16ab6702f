//! Package index documents, version choices and search-page extraction.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::imports::IdentifierExtractor;

/// Upper bound on names taken from a search page.
pub const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProjectMetadata {
    pub info: ProjectInfo,
    /// Release files keyed by version, in document order.
    #[serde(default)]
    pub releases: IndexMap<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ProjectMetadata {
    pub fn latest_version(&self) -> Option<&str> {
        self.info
            .version
            .as_deref()
            .map(str::trim)
            .filter(|version| !version.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VersionChoice {
    pub version: String,
    pub latest: bool,
}

/// Versions offered for installation: latest first, then every release in
/// document order without repeating latest.
pub fn version_choices(metadata: &ProjectMetadata) -> Vec<VersionChoice> {
    let latest = metadata.latest_version();
    let mut choices = Vec::with_capacity(metadata.releases.len() + 1);
    if let Some(latest) = latest {
        choices.push(VersionChoice {
            version: latest.to_string(),
            latest: true,
        });
    }
    choices.extend(
        metadata
            .releases
            .keys()
            .filter(|version| Some(version.as_str()) != latest)
            .filter(|version| !version.trim().is_empty())
            .map(|version| VersionChoice {
                version: version.clone(),
                latest: false,
            }),
    );
    choices
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub version: String,
    pub summary: String,
}

impl SearchHit {
    pub fn from_metadata(metadata: &ProjectMetadata) -> Self {
        Self {
            name: metadata.info.name.clone(),
            version: metadata.latest_version().unwrap_or_default().to_string(),
            summary: metadata.info.summary.clone().unwrap_or_default(),
        }
    }
}

static SNIPPET_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class="package-snippet__name"[^>]*>([^<]+)</span>"#).expect("snippet pattern")
});
static PROJECT_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="/project/([A-Za-z0-9_.\-]+)/"#).expect("project link pattern")
});
static LEGACY_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="/pypi/([A-Za-z0-9_.\-]+)""#).expect("legacy link pattern")
});

/// Which markup shape a search page is scraped for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMarkup {
    /// `<span class="package-snippet__name">NAME</span>` on the current site.
    SnippetName,
    /// `href="/project/NAME/"` links on the current site.
    ProjectLink,
    /// `href="/pypi/NAME"` links on the legacy site.
    LegacyLink,
}

impl SearchMarkup {
    fn pattern(self) -> &'static Regex {
        match self {
            SearchMarkup::SnippetName => &SNIPPET_NAME_RE,
            SearchMarkup::ProjectLink => &PROJECT_LINK_RE,
            SearchMarkup::LegacyLink => &LEGACY_LINK_RE,
        }
    }
}

impl IdentifierExtractor for SearchMarkup {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for captures in self.pattern().captures_iter(text) {
            if names.len() >= MAX_SEARCH_RESULTS {
                break;
            }
            let Some(found) = captures.get(1) else {
                continue;
            };
            let name = found.as_str().trim();
            if !name.is_empty() && !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

/// Names from a current search page: snippet spans, else project links.
pub fn extract_search_names(html: &str) -> Vec<String> {
    let names = SearchMarkup::SnippetName.extract(html);
    if names.is_empty() {
        SearchMarkup::ProjectLink.extract(html)
    } else {
        names
    }
}
