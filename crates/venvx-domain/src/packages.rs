use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use pep440_rs::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A package enriched with index and usage information for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageStatus {
    pub name: String,
    pub version: String,
    pub latest: Option<String>,
    pub outdated: bool,
    pub unused: bool,
}

/// Parses `pip list --format=json` output.
///
/// Anything that is not a JSON array yields an empty list. Elements missing a
/// name are skipped; the result is sorted by name with ordinal comparison.
pub fn parse_pip_list(stdout: &str) -> Vec<PackageRecord> {
    let trimmed = stdout.trim();
    let parsed: Value = if trimmed.is_empty() {
        Value::Array(Vec::new())
    } else {
        match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(%err, "pip list output is not valid JSON");
                return Vec::new();
            }
        }
    };
    let Value::Array(items) = parsed else {
        return Vec::new();
    };
    let mut records: Vec<PackageRecord> = items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").map(value_to_string)?;
            let version = item.get("version").map(value_to_string).unwrap_or_default();
            Some(PackageRecord { name, version })
        })
        .collect();
    sort_packages(&mut records);
    records
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn sort_packages(records: &mut [PackageRecord]) {
    records.sort_by(|left, right| left.name.cmp(&right.name));
}

/// Whether `latest` should be offered as an upgrade over `installed`.
///
/// PEP 440 ordering is used when both parse; otherwise any difference counts.
pub fn is_outdated(installed: &str, latest: Option<&str>) -> bool {
    let Some(latest) = latest.map(str::trim).filter(|text| !text.is_empty()) else {
        return false;
    };
    match (Version::from_str(installed.trim()), Version::from_str(latest)) {
        (Ok(current), Ok(newest)) => newest > current,
        _ => latest != installed.trim(),
    }
}

/// Joins installed packages with latest versions and the unused set.
///
/// `unused` holds lower-cased distribution names.
pub fn package_statuses(
    records: &[PackageRecord],
    latest: &HashMap<String, String>,
    unused: &BTreeSet<String>,
) -> Vec<PackageStatus> {
    records
        .iter()
        .map(|record| {
            let newest = latest.get(&record.name).cloned();
            PackageStatus {
                name: record.name.clone(),
                version: record.version.clone(),
                outdated: is_outdated(&record.version, newest.as_deref()),
                latest: newest,
                unused: unused.contains(&record.name.to_lowercase()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pip_list_sorts_by_name() {
        let stdout = r#"[{"name": "zlib", "version": "1.0"}, {"name": "attrs", "version": "2.0"}]"#;
        let names: Vec<String> = parse_pip_list(stdout)
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, vec!["attrs", "zlib"]);
    }

    #[test]
    fn parse_pip_list_sorts_ordinally() {
        let stdout = r#"[{"name": "requests", "version": "2"}, {"name": "Babel", "version": "1"}]"#;
        let names: Vec<String> = parse_pip_list(stdout)
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, vec!["Babel", "requests"]);
    }

    #[test]
    fn malformed_or_non_array_output_is_empty() {
        assert!(parse_pip_list("").is_empty());
        assert!(parse_pip_list("WARNING: pip is old").is_empty());
        assert!(parse_pip_list(r#"{"name": "attrs"}"#).is_empty());
        assert_eq!(
            parse_pip_list(r#"[{"version": "1"}, {"name": "six", "version": 1.16}]"#),
            vec![PackageRecord::new("six", "1.16")]
        );
    }

    #[test]
    fn outdated_uses_pep440_ordering() {
        assert!(is_outdated("2.30.0", Some("2.31.0")));
        assert!(!is_outdated("2.31.0", Some("2.31.0")));
        assert!(!is_outdated("2.31", Some("2.31.0")));
        assert!(!is_outdated("3.0.0rc1", Some("2.9")));
        assert!(!is_outdated("1.0", None));
        assert!(is_outdated("weird-build", Some("1.0")));
    }

    #[test]
    fn statuses_join_latest_and_unused() {
        let records = vec![
            PackageRecord::new("PyYAML", "6.0"),
            PackageRecord::new("requests", "2.31.0"),
        ];
        let latest = HashMap::from([("PyYAML".to_string(), "6.0.1".to_string())]);
        let unused = BTreeSet::from(["pyyaml".to_string()]);
        let statuses = package_statuses(&records, &latest, &unused);
        assert!(statuses[0].outdated);
        assert!(statuses[0].unused);
        assert_eq!(statuses[0].latest.as_deref(), Some("6.0.1"));
        assert!(!statuses[1].outdated);
        assert!(!statuses[1].unused);
        assert!(statuses[1].latest.is_none());
    }
}
