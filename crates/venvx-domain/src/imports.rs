//! Static import extraction and the unused-distribution decision.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Pulls candidate identifiers out of a blob of text.
///
/// Import scanning and search-page scraping both go through this so the
/// matching strategy can change without touching callers.
pub trait IdentifierExtractor {
    fn extract(&self, text: &str) -> Vec<String>;
}

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:from[ \t]+([A-Za-z_][\w.]*)[ \t]+import\b|import[ \t]+([^\r\n#;]+))",
    )
    .expect("import pattern")
});

/// Line-anchored scanner for `from X import ...` and `import X[, Y]`.
///
/// Yields the first dot-separated segment of every named module. Relative
/// imports are skipped since they never name an installed distribution.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportScanner;

impl IdentifierExtractor for ImportScanner {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut modules = Vec::new();
        for captures in IMPORT_RE.captures_iter(text) {
            if let Some(module) = captures.get(1) {
                push_top_level(&mut modules, module.as_str());
            } else if let Some(list) = captures.get(2) {
                for item in list.as_str().split(',') {
                    let name = item.split_whitespace().next().unwrap_or_default();
                    push_top_level(&mut modules, name);
                }
            }
        }
        modules
    }
}

fn push_top_level(modules: &mut Vec<String>, dotted: &str) {
    let head = dotted.split('.').next().unwrap_or_default();
    let valid = head
        .chars()
        .next()
        .is_some_and(|first| first == '_' || first.is_alphabetic())
        && head.chars().all(|ch| ch == '_' || ch.is_alphanumeric());
    if valid {
        modules.push(head.to_string());
    }
}

/// Collects used top-level module names across many source texts.
pub fn collect_used_modules<'a>(
    extractor: &dyn IdentifierExtractor,
    sources: impl IntoIterator<Item = &'a str>,
) -> HashSet<String> {
    sources
        .into_iter()
        .flat_map(|text| extractor.extract(text))
        .collect()
}

/// Distributions whose modules never show up in `used`.
///
/// A distribution without any known module is never reported, since there is
/// nothing to look for.
pub fn find_unused_distributions(
    distributions: &BTreeMap<String, Vec<String>>,
    used: &HashSet<String>,
) -> BTreeSet<String> {
    distributions
        .iter()
        .filter(|(_, modules)| !modules.is_empty())
        .filter(|(_, modules)| !modules.iter().any(|module| used.contains(module)))
        .map(|(dist, _)| dist.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<String> {
        ImportScanner.extract(text)
    }

    #[test]
    fn extracts_both_import_forms() {
        let text = "import os\nfrom requests.adapters import HTTPAdapter\nimport numpy as np\n";
        assert_eq!(scan(text), vec!["os", "requests", "numpy"]);
    }

    #[test]
    fn extracts_comma_lists_and_indented_imports() {
        let text = "import json, yaml as y\ndef f():\n    import attr.validators\n";
        assert_eq!(scan(text), vec!["json", "yaml", "attr"]);
    }

    #[test]
    fn ignores_relative_and_mid_line_imports() {
        let text = "from . import sibling\nfrom .pkg import thing\nx = 1  # import fake\n";
        assert!(scan(text).is_empty());
    }

    #[test]
    fn requests_is_unused_until_imported() {
        let mapping = BTreeMap::from([
            ("requests".to_string(), vec!["requests".to_string()]),
            ("pip".to_string(), Vec::new()),
        ]);
        let without = collect_used_modules(&ImportScanner, ["import os\n", "print('requests')\n"]);
        let unused = find_unused_distributions(&mapping, &without);
        assert_eq!(unused, BTreeSet::from(["requests".to_string()]));

        let with = collect_used_modules(&ImportScanner, ["import requests\n"]);
        assert!(find_unused_distributions(&mapping, &with).is_empty());

        let with_from = collect_used_modules(&ImportScanner, ["from requests import get\n"]);
        assert!(find_unused_distributions(&mapping, &with_from).is_empty());
    }

    #[test]
    fn any_module_counts_as_usage() {
        let mapping = BTreeMap::from([(
            "PyYAML".to_string(),
            vec!["_yaml".to_string(), "yaml".to_string()],
        )]);
        let used = HashSet::from(["yaml".to_string()]);
        assert!(find_unused_distributions(&mapping, &used).is_empty());
        let unused = find_unused_distributions(&mapping, &HashSet::new());
        assert_eq!(unused, BTreeSet::from(["pyyaml".to_string()]));
    }

    #[test]
    fn decision_is_stable_across_runs() {
        let mapping = BTreeMap::from([
            ("attrs".to_string(), vec!["attr".to_string(), "attrs".to_string()]),
            ("click".to_string(), vec!["click".to_string()]),
        ]);
        let sources = ["import click\n", "x = 1\n"];
        let first = find_unused_distributions(
            &mapping,
            &collect_used_modules(&ImportScanner, sources),
        );
        let second = find_unused_distributions(
            &mapping,
            &collect_used_modules(&ImportScanner, sources),
        );
        assert_eq!(first, second);
        assert_eq!(first, BTreeSet::from(["attrs".to_string()]));
    }
}
